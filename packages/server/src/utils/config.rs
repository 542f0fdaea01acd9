use once_cell::sync::Lazy;
use std::env;
use std::net::SocketAddr;

pub static CONFIG: Lazy<ServerConfig> = Lazy::new(ServerConfig::from_env);

const DEFAULT_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    fn from_env() -> Self {
        let server_addr = env::var("SERVER_ADDR")
            .ok()
            .and_then(|addr| match addr.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    log::warn!("SERVER_ADDR {} is invalid ({}); using {}", addr, e, DEFAULT_ADDR);
                    None
                }
            })
            .unwrap_or_else(default_addr);

        let origins = env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_string());

        Self {
            server_addr,
            allowed_origins: parse_origins(&origins),
        }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins(" http://a.test , http://b.test,,"),
            vec!["http://a.test", "http://b.test"]
        );
    }

    #[test]
    fn default_address_matches_constant() {
        assert_eq!(default_addr().to_string(), DEFAULT_ADDR);
    }
}
