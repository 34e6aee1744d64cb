//! Sessão de echo: dona do socket RAW, conduz o ciclo sonda/resposta.
//!
//! Ciclo de vida: aberta uma vez, usada para quantas sondas o chamador
//! quiser e fechada exatamente uma vez, inclusive nas saídas por erro (o
//! `Drop` cobre qualquer caminho que não chamou [`EchoSession::close`]).
//! A sessão nunca repete uma sonda por conta própria; repetir é decisão do
//! chamador, com um sequence novo.

use crate::error::PingError;
use crate::icmp::{self, IcmpMessage};
use crate::privilege;
use crate::transport::{Icmp4Socket, RawTransport};

use log::debug;

use std::collections::HashMap;
use std::io;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

// Buffer de recepção (MTU típica)
const RECV_BUFFER: usize = 1500;

/// Uma sonda pendente: identifica o Echo Request em voo e quando partiu.
#[derive(Debug, Clone, Copy)]
pub struct EchoProbe {
    pub ident: u16,
    pub sequence: u16,
    pub sent_at: Instant,
}

impl EchoProbe {
    fn key(&self) -> (u16, u16) {
        (self.ident, self.sequence)
    }
}

/// Desfecho de um ciclo sonda/resposta.
///
/// Timeout e erros reportados pela rede são desfechos normais, não erros:
/// o chamador decide o que fazer com cada um.
#[derive(Debug)]
pub enum RoundTrip {
    /// Echo Reply casou com a sonda. `bytes` é o tamanho da mensagem ICMP
    /// recebida.
    Success { rtt: Duration, bytes: usize },

    /// Nenhuma resposta casou dentro do prazo.
    TimedOut,

    /// A rede respondeu com um erro ICMP correlacionado à sonda (destino
    /// inacessível, TTL excedido, etc.).
    Unreachable { mtype: u8, code: u8 },

    /// Falha dura de transporte na recepção.
    Errored { reason: io::Error },
}

/// Sessão ICMP echo sobre um único socket RAW, um único alvo.
pub struct EchoSession {
    transport: Option<Box<dyn RawTransport>>,
    target: Ipv4Addr,
    // Sondas em voo, chaveadas por (identifier, sequence). Uso
    // single-threaded cooperativo: sem lock.
    pending: HashMap<(u16, u16), EchoProbe>,
    next_seq: u16,
}

impl EchoSession {
    /// Abre uma sessão contra `target`.
    ///
    /// O privilégio é conferido antes da syscall de socket, para que a
    /// falta dele apareça como `PermissionDenied` e não como uma recusa
    /// genérica do sistema.
    pub fn open(target: Ipv4Addr) -> Result<EchoSession, PingError> {
        privilege::ensure_raw_socket_privilege()?;
        let transport = Icmp4Socket::open(target)?;
        Ok(EchoSession::with_transport(Box::new(transport), target))
    }

    /// Monta uma sessão sobre um transporte já aberto. É o ponto de
    /// injeção para testes e para plataformas fora do caminho padrão.
    pub fn with_transport(transport: Box<dyn RawTransport>, target: Ipv4Addr) -> EchoSession {
        EchoSession {
            transport: Some(transport),
            target,
            pending: HashMap::new(),
            next_seq: 1,
        }
    }

    /// Alvo da sessão.
    pub fn target(&self) -> Ipv4Addr {
        self.target
    }

    /// Sondas ainda em voo.
    pub fn outstanding(&self) -> usize {
        self.pending.len()
    }

    /// Próximo sequence livre para `ident`: incrementa com wrap módulo
    /// 65536 pulando o zero e qualquer sequence ainda pendente.
    pub fn next_sequence(&mut self, ident: u16) -> u16 {
        loop {
            let seq = self.next_seq;
            self.next_seq = self.next_seq.wrapping_add(1);
            if self.next_seq == 0 {
                self.next_seq = 1;
            }
            if !self.pending.contains_key(&(ident, seq)) {
                return seq;
            }
        }
    }

    /// Monta, soma o checksum e transmite um Echo Request; registra a
    /// sonda como pendente.
    ///
    /// `SendFailed` não fecha a sessão: o chamador pode tentar de novo com
    /// um sequence novo.
    pub fn send_probe(
        &mut self,
        ident: u16,
        sequence: u16,
        payload: &[u8],
    ) -> Result<EchoProbe, PingError> {
        if payload.len() > icmp::MAX_PAYLOAD {
            return Err(PingError::PayloadTooLarge);
        }
        let transport = self.transport.as_mut().ok_or(PingError::SessionClosed)?;

        let pkt = icmp::build_echo_request(ident, sequence, payload);
        transport.send(&pkt).map_err(PingError::SendFailed)?;

        let probe = EchoProbe {
            ident,
            sequence,
            sent_at: Instant::now(),
        };
        self.pending.insert(probe.key(), probe);
        Ok(probe)
    }

    /// Bloqueia até a resposta da sonda, um erro ICMP correlacionado a ela
    /// ou o fim do prazo. Único ponto de suspensão da sessão.
    ///
    /// O prazo conta a partir do envio (`sent_at + timeout`) e é imposto
    /// aqui, não pelo socket. Tudo que chegar sem casar com a sonda é
    /// descartado e a espera continua: replies de outros pingers no mesmo
    /// host, sequences velhos, datagramas malformados.
    pub fn await_reply(&mut self, probe: &EchoProbe, timeout: Duration) -> RoundTrip {
        let key = probe.key();
        let deadline = probe.sent_at + timeout;

        let Some(transport) = self.transport.as_mut() else {
            return RoundTrip::Errored {
                reason: io::Error::new(io::ErrorKind::NotConnected, "sessão encerrada"),
            };
        };

        let mut buf = [0u8; RECV_BUFFER];
        loop {
            if Instant::now() >= deadline {
                // Prazo esgotado: a sonda morre aqui; uma resposta
                // atrasada será descartada como não casada.
                self.pending.remove(&key);
                return RoundTrip::TimedOut;
            }

            let n = match transport.recv(&mut buf) {
                Ok(n) => n,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue;
                }
                Err(e) => return RoundTrip::Errored { reason: e },
            };

            let msg = &buf[..n];
            let reply = icmp::icmp_payload(msg);
            let parsed = match icmp::parse_message(reply) {
                Some(p) => p,
                None => {
                    debug!("descartado: datagrama malformado de {} bytes", n);
                    continue;
                }
            };

            match parsed {
                IcmpMessage::EchoReply { ident, seq }
                    if (ident, seq) == key && self.pending.contains_key(&key) =>
                {
                    self.pending.remove(&key);
                    return RoundTrip::Success {
                        rtt: probe.sent_at.elapsed(),
                        bytes: reply.len(),
                    };
                }
                IcmpMessage::UpstreamError {
                    mtype,
                    code,
                    original: Some(orig),
                } if orig == key && self.pending.contains_key(&key) => {
                    self.pending.remove(&key);
                    return RoundTrip::Unreachable { mtype, code };
                }
                other => {
                    debug!("descartado: {:?} não casa com {:?}", other, key);
                }
            }
        }
    }

    /// Abandona uma sonda antes do prazo; a resposta atrasada, se vier,
    /// será descartada como não casada.
    pub fn cancel_probe(&mut self, probe: &EchoProbe) {
        self.pending.remove(&probe.key());
    }

    /// Libera o socket. Idempotente: fechar de novo é um no-op.
    pub fn close(&mut self) {
        self.transport = None;
    }
}

impl Drop for EchoSession {
    fn drop(&mut self) {
        self.close();
    }
}
