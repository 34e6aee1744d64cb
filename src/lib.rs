//! Utilitário ICMP echo ("ping") mínimo sobre sockets RAW.
//!
//! A biblioteca expõe duas peças: o motor de checksum e construção de
//! pacotes ([`icmp`]) e a sessão de echo ([`session::EchoSession`]), que é
//! dona do socket e conduz o ciclo sonda/resposta. O binário `ppingrs` é
//! apenas um consumidor fino dessa superfície.
//!
//! Erros por sonda (envio, timeout, resposta de erro ICMP) voltam como
//! resultados tipados; quem decide repetir, reportar ou abortar é o
//! chamador. A sessão nunca encerra o processo.

pub mod error;
pub mod icmp;
pub mod privilege;
pub mod session;
pub mod transport;

pub use error::PingError;
pub use session::{EchoProbe, EchoSession, RoundTrip};
pub use transport::{Icmp4Socket, RawTransport};
