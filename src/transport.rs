//! Transporte RAW por baixo da sessão de echo.
//!
//! A sessão enxerga só a capacidade {enviar datagrama, receber datagrama};
//! abrir é o construtor da implementação concreta e fechar é o `Drop`. Isso
//! deixa a escolha de plataforma num lugar único e permite injetar um
//! transporte de mentira nos testes.

use crate::error::PingError;

// Criação e configuração de sockets de baixo nível
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Timeout de leitura do socket. É só o passo de polling: o prazo real de
/// cada sonda é imposto pela sessão, não pelo transporte.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capacidade mínima de um transporte ICMP bruto.
pub trait RawTransport {
    /// Transmite um datagrama ICMP completo ao alvo.
    fn send(&mut self, packet: &[u8]) -> io::Result<usize>;

    /// Lê o próximo datagrama recebido; pode devolver `WouldBlock` ou
    /// `TimedOut` quando nada chega dentro do passo de polling.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

/// Socket RAW ICMPv4 apontado para um único alvo.
pub struct Icmp4Socket {
    sock: Socket,
    dst: SockAddr,
}

impl Icmp4Socket {
    /// Abre o socket RAW.
    ///
    /// `PermissionDenied` quando falta privilégio; qualquer outra recusa do
    /// sistema vira `SocketUnavailable`.
    pub fn open(target: Ipv4Addr) -> Result<Self, PingError> {
        // Domain::IPV4 -> AF_INET
        // Type::RAW -> SOCK_RAW (Necessário no Windows para ICMP)
        // Protocol::ICMPV4 -> IPPROTO_ICMP
        // Nota: SOCK_RAW é 3. Usamos o valor direto pois libc::SOCK_RAW pode não estar disponível no Windows.
        let sock = Socket::new(Domain::IPV4, Type::from(3), Some(Protocol::ICMPV4)).map_err(
            |e| match e.kind() {
                io::ErrorKind::PermissionDenied => PingError::PermissionDenied,
                _ => PingError::SocketUnavailable(e),
            },
        )?;

        sock.set_read_timeout(Some(POLL_INTERVAL))
            .map_err(PingError::SocketUnavailable)?;

        // Endereço de destino (porta 0 é ignorada para ICMP)
        let dst = SockAddr::from(SocketAddr::new(IpAddr::V4(target), 0));

        Ok(Icmp4Socket { sock, dst })
    }
}

impl RawTransport for Icmp4Socket {
    fn send(&mut self, packet: &[u8]) -> io::Result<usize> {
        self.sock.send_to(packet, &self.dst)
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        // Usando `read` do std::io::Read
        self.sock.read(buf)
    }
}
