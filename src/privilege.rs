//! Verificação de privilégio para sockets RAW, feita uma vez na partida e
//! de novo em `EchoSession::open`, antes de qualquer syscall de socket.

use crate::error::PingError;

/// Confirma que o processo pode criar sockets RAW.
#[cfg(unix)]
pub fn ensure_raw_socket_privilege() -> Result<(), PingError> {
    // uid efetivo, para que binários setuid root também passem
    let euid = unsafe { libc::geteuid() };
    if euid != 0 {
        return Err(PingError::PermissionDenied);
    }
    Ok(())
}

/// No Windows não há como consultar barato o privilégio de Administrador;
/// a recusa aparece na criação do socket e é mapeada lá para
/// `PermissionDenied`.
#[cfg(windows)]
pub fn ensure_raw_socket_privilege() -> Result<(), PingError> {
    Ok(())
}
