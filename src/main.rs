// Tratamento de erros ergonômico
use anyhow::{Context, Result};

use std::process::ExitCode;
use std::thread;

use ppingrs::icmp;
use ppingrs::session::{EchoSession, RoundTrip};
use ppingrs::{PingError, privilege};

// Módulo local do binário
mod args;

// Códigos de saída distintos por classe de falha
const EXIT_SEM_RESPOSTA: u8 = 1;
const EXIT_CONFIG: u8 = 2;
const EXIT_PRIVILEGIO: u8 = 3;
const EXIT_REDE: u8 = 4;

/// Programa principal: envia Echo Requests e aguarda Echo Replies.
/// Requer privilégios elevados para o socket RAW (root no Unix,
/// Administrador no Windows).
fn main() -> ExitCode {
    // Parsing de argumentos via módulo args
    let args = match args::parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("ppingrs: {:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // Privilégio conferido uma única vez na partida, antes de qualquer
    // trabalho de socket
    if let Err(e) = privilege::ensure_raw_socket_privilege() {
        eprintln!("ppingrs: {}", e);
        return ExitCode::from(EXIT_PRIVILEGIO);
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_SEM_RESPOSTA),
        Err(e) => {
            eprintln!("ppingrs: {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn exit_code_for(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<PingError>() {
        Some(PingError::PermissionDenied) => EXIT_PRIVILEGIO,
        _ => EXIT_REDE,
    }
}

/// Dispara as sondas e diz se alguma resposta casou.
fn run(args: &args::PingArgs) -> Result<bool> {
    // Configura handler para Ctrl+C
    let running = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Erro ao configurar handler de Ctrl+C")?;

    // A sessão é dona do socket do início ao fim; qualquer retorno
    // antecipado libera o socket pelo Drop
    let mut session = EchoSession::open(args.host)?;

    // Identificador: usa o PID do processo (comum em pings)
    let ident: u16 = std::process::id() as u16;

    // Payload de enchimento, como no pping original
    let payload = vec![b'g'; args.size];

    println!(
        "Disparando {} com {} bytes de dados:",
        session.target(),
        payload.len()
    );

    let mut received = 0u64;
    for sent in 0..args.count {
        // Verifica se foi interrompido
        if !running.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }

        let seq = session.next_sequence(ident);
        match session.send_probe(ident, seq, &payload) {
            Ok(probe) => match session.await_reply(&probe, args.timeout) {
                RoundTrip::Success { rtt, bytes } => {
                    println!(
                        "Resposta de {}: bytes={} icmp_seq={} tempo={:.2}ms",
                        session.target(),
                        bytes,
                        seq,
                        rtt.as_secs_f64() * 1000.0
                    );
                    received += 1;
                }
                RoundTrip::TimedOut => println!("Esgotado o tempo limite do pedido."),
                RoundTrip::Unreachable { mtype, code } => println!(
                    "Resposta de erro de {}: {}",
                    session.target(),
                    icmp::describe_error(mtype, code)
                ),
                RoundTrip::Errored { reason } => println!("Erro na leitura: {}", reason),
            },
            // Envio falhou: a sessão segue utilizável; passa para a
            // próxima sonda
            Err(e @ PingError::SendFailed(_)) => println!("{}", e),
            Err(e) => return Err(e.into()),
        }

        // Verifica interrupção antes do sleep
        if !running.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }

        // Pausa entre sondas; não dorme depois da última
        if sent + 1 < args.count {
            thread::sleep(args.interval);
        }
    }

    session.close();
    Ok(received > 0)
}
