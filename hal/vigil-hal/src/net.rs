//! Wireless networking abstractions
//!
//! Covers just what the broadcast path and the capability table need:
//! the current role, interface addressing, the list of associated
//! stations when acting as an access point, and a datagram socket.

use core::net::Ipv4Addr;

/// Current wireless role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiRole {
    /// Radio off
    Off,
    /// Associated to an upstream access point
    Station,
    /// Serving clients as a soft access point
    AccessPoint,
}

/// Network interface selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interface {
    /// Station (client) interface
    Station,
    /// Soft access point interface
    SoftAp,
}

/// IPv4 addressing of one interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Info {
    /// Local address
    pub address: Ipv4Addr,
    /// Subnet mask
    pub netmask: Ipv4Addr,
}

impl Ipv4Info {
    /// Create interface info
    pub const fn new(address: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self { address, netmask }
    }
}

/// Wi-Fi driver
///
/// Station membership is owned by the driver. [`WifiDriver::stations`]
/// hands out a fresh snapshot on every call; dropping the iterator
/// releases whatever list the vendor stack allocated.
pub trait WifiDriver {
    /// Iterator over associated station addresses
    type Stations<'a>: Iterator<Item = Ipv4Addr>
    where
        Self: 'a;

    /// Current role
    fn role(&self) -> WifiRole;

    /// Addressing of the given interface
    fn ip_info(&self, interface: Interface) -> Ipv4Info;

    /// Snapshot of stations associated to the soft AP
    ///
    /// Empty when not in access-point role.
    fn stations(&mut self) -> Self::Stations<'_>;

    /// Set transmit power in dBm
    fn set_output_power(&mut self, dbm: f32);

    /// Set the soft-AP DHCP lease time in seconds
    fn set_dhcp_lease_time(&mut self, seconds: u32);

    /// Set the DHCP hostname
    fn set_hostname(&mut self, hostname: &str) -> bool;
}

/// Connectionless datagram socket
pub trait DatagramSocket {
    /// Error type for send operations
    type Error;

    /// Send one datagram
    fn send_to(&mut self, addr: Ipv4Addr, port: u16, payload: &[u8]) -> Result<(), Self::Error>;

    /// Close every socket the stack has open
    fn stop_all(&mut self);
}
