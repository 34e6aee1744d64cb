use std::error::Error;
use std::fmt;
use std::io;

/// Erros da sessão de echo.
///
/// Falhas de configuração da linha de comando ficam fora daqui: são
/// tratadas pelo binário antes de qualquer socket ser aberto. Timeout e
/// respostas de erro ICMP também não são erros, e sim desfechos
/// ([`crate::session::RoundTrip`]).
#[derive(Debug)]
pub enum PingError {
    /// Sem privilégio para criar sockets RAW.
    PermissionDenied,

    /// O sistema recusou a criação do socket por outro motivo.
    SocketUnavailable(io::Error),

    /// Payload maior que o máximo de um pacote ICMP (65507 octetos).
    PayloadTooLarge,

    /// Erro de transporte ao transmitir; a sessão continua utilizável.
    SendFailed(io::Error),

    /// Operação sobre uma sessão já encerrada por `close`.
    SessionClosed,
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PingError::PermissionDenied => {
                write!(f, "São necessários privilégios de root para criar sockets RAW")
            }
            PingError::SocketUnavailable(ref e) => {
                write!(f, "Falha ao criar socket RAW: {}", e)
            }
            PingError::PayloadTooLarge => {
                write!(f, "Payload excede o tamanho máximo de um pacote ICMP")
            }
            PingError::SendFailed(ref e) => write!(f, "Falha ao enviar: {}", e),
            PingError::SessionClosed => write!(f, "Sessão já encerrada"),
        }
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            PingError::SocketUnavailable(ref e) | PingError::SendFailed(ref e) => Some(e),
            _ => None,
        }
    }
}
