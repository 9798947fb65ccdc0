use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 8080;

pub const VIEW_TEMPLATE: &str = "view.html";
pub const EDIT_TEMPLATE: &str = "edit.html";
pub const HOME_TEMPLATE: &str = "home.html";

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `.page` files and static assets
    pub root_dir: Arc<PathBuf>,
    /// Directory searched for `view.html`, `edit.html` and `home.html`
    pub template_dir: Arc<PathBuf>,
    pub port: u16,
    pub host: IpAddr,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            root_dir: Arc::new(PathBuf::from(".")),
            template_dir: Arc::new(PathBuf::from(".")),
            port: DEFAULT_PORT,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        }
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
