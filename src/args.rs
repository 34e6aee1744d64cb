use anyhow::{Context, Result};
use ppingrs::icmp;
use std::net::Ipv4Addr;
use std::time::Duration;

const USAGE: &str =
    "Uso: ppingrs --host <ipv4> [--version <4|6>] [--count <n>] [--timeout <ms>] [--interval <ms>] [--size <octetos>]";

pub struct PingArgs {
    pub host: Ipv4Addr,
    pub count: u64,
    pub timeout: Duration,
    pub interval: Duration,
    pub size: usize,
}

pub fn parse() -> Result<PingArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_from(&argv)
}

fn value_of<'a>(argv: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    if i + 1 < argv.len() {
        Ok(argv[i + 1].as_str())
    } else {
        anyhow::bail!("Faltou o valor para {}", flag);
    }
}

pub fn parse_from(argv: &[String]) -> Result<PingArgs> {
    let mut host_str = None;

    // Padrões do pping original
    let mut version = "4".to_string();
    let mut count = 5u64;
    let mut timeout_ms = 5000u64;
    let mut interval_ms = 100u64;
    let mut size = 56usize;

    let mut i = 0;
    while i < argv.len() {
        match argv[i].as_str() {
            "--host" => {
                host_str = Some(value_of(argv, i, "--host")?.to_string());
                i += 1;
            }
            "--version" => {
                version = value_of(argv, i, "--version")?.to_string();
                i += 1;
            }
            "--count" | "-c" => {
                count = value_of(argv, i, "--count")?
                    .parse()
                    .context("Valor inválido para --count")?;
                i += 1;
            }
            "--timeout" => {
                timeout_ms = value_of(argv, i, "--timeout")?
                    .parse()
                    .context("Valor inválido para --timeout")?;
                i += 1;
            }
            "--interval" => {
                interval_ms = value_of(argv, i, "--interval")?
                    .parse()
                    .context("Valor inválido para --interval")?;
                i += 1;
            }
            "--size" => {
                size = value_of(argv, i, "--size")?
                    .parse()
                    .context("Valor inválido para --size")?;
                i += 1;
            }
            other => anyhow::bail!("Argumento desconhecido: {}\n{}", other, USAGE),
        }
        i += 1;
    }

    match version.as_str() {
        "4" => {}
        // O modo 6 nunca saiu do papel no pping original; recusar é mais
        // honesto do que fingir que o probe foi ICMPv6
        "6" => anyhow::bail!("ICMPv6 não é suportado"),
        other => anyhow::bail!("Valor inválido para --version: {}", other),
    }

    if timeout_ms == 0 {
        anyhow::bail!("O timeout deve ser maior que zero");
    }
    if size > icmp::MAX_PAYLOAD {
        anyhow::bail!("Payload excede o tamanho máximo de um pacote ICMP");
    }

    let host_str = host_str.context(USAGE)?;
    let host: Ipv4Addr = host_str.parse().context("Endereço IP inválido")?;

    Ok(PingArgs {
        host,
        count,
        timeout: Duration::from_millis(timeout_ms),
        interval: Duration::from_millis(interval_ms),
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn host_com_padroes_do_original() {
        let a = parse_from(&argv(&["--host", "127.0.0.1"])).unwrap();
        assert_eq!(a.host, Ipv4Addr::new(127, 0, 0, 1));
        assert_eq!(a.count, 5);
        assert_eq!(a.timeout, Duration::from_millis(5000));
        assert_eq!(a.interval, Duration::from_millis(100));
        assert_eq!(a.size, 56);
    }

    #[test]
    fn host_eh_obrigatorio() {
        assert!(parse_from(&argv(&[])).is_err());
        assert!(parse_from(&argv(&["--count", "3"])).is_err());
    }

    #[test]
    fn endereco_invalido_eh_fatal() {
        assert!(parse_from(&argv(&["--host", "nem.um.ip"])).is_err());
        assert!(parse_from(&argv(&["--host", "999.0.0.1"])).is_err());
    }

    #[test]
    fn flags_explicitas_sobrescrevem_padroes() {
        let a = parse_from(&argv(&[
            "--host", "8.8.8.8", "-c", "3", "--timeout", "2000", "--interval", "500", "--size",
            "0",
        ]))
        .unwrap();
        assert_eq!(a.count, 3);
        assert_eq!(a.timeout, Duration::from_millis(2000));
        assert_eq!(a.interval, Duration::from_millis(500));
        assert_eq!(a.size, 0);
    }

    #[test]
    fn version_4_passa_e_6_eh_recusado() {
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--version", "4"])).is_ok());
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--version", "6"])).is_err());
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--version", "x"])).is_err());
    }

    #[test]
    fn timeout_zero_eh_recusado() {
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--timeout", "0"])).is_err());
    }

    #[test]
    fn size_acima_do_maximo_eh_recusado() {
        let too_big = (icmp::MAX_PAYLOAD + 1).to_string();
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--size", &too_big])).is_err());
    }

    #[test]
    fn flag_sem_valor_eh_recusada() {
        assert!(parse_from(&argv(&["--host"])).is_err());
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--count"])).is_err());
    }

    #[test]
    fn argumento_desconhecido_eh_recusado() {
        assert!(parse_from(&argv(&["--host", "127.0.0.1", "--ttl", "64"])).is_err());
        assert!(parse_from(&argv(&["127.0.0.1"])).is_err());
    }
}
