//! Web server command.

use console::style;

use crate::config::{Config, Settings};

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, config: &Config, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    println!(
        "{} Starting docshelf server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Data directory: {}", settings.data_dir.display());
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, config, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "3030" -> 127.0.0.1:3030
/// - Just a host: "0.0.0.0" -> 0.0.0.0:3030
/// - Host and port: "0.0.0.0:3030" -> 0.0.0.0:3030
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    let bind = bind.trim();
    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }

    // Try parsing as just a port number
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }

    // Try parsing as host:port
    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return Ok((host.to_string(), port));
        }
        anyhow::bail!("Invalid port in bind address: {}", bind);
    }

    // Must be just a host, use default port
    Ok((bind.to_string(), 3030))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_only() {
        assert_eq!(
            parse_bind_address("8080").unwrap(),
            ("127.0.0.1".to_string(), 8080)
        );
    }

    #[test]
    fn test_host_only() {
        assert_eq!(
            parse_bind_address("0.0.0.0").unwrap(),
            ("0.0.0.0".to_string(), 3030)
        );
    }

    #[test]
    fn test_host_and_port() {
        assert_eq!(
            parse_bind_address("192.168.1.5:9000").unwrap(),
            ("192.168.1.5".to_string(), 9000)
        );
    }

    #[test]
    fn test_invalid() {
        assert!(parse_bind_address("").is_err());
        assert!(parse_bind_address("localhost:http").is_err());
    }
}
