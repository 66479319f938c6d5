//! Wireless broadcast
//!
//! Sends one datagram to every reachable peer. On the smaller chips the
//! GNSS serial input and the radio stack compete for the same resources,
//! so reception is paused around each individual send.

use core::net::Ipv4Addr;

use vigil_hal::{DatagramSocket, Interface, SerialInput, WifiDriver, WifiRole};

/// Directed broadcast address of a subnet
pub fn broadcast_address(address: Ipv4Addr, netmask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(address) | !u32::from(netmask))
}

/// Send `payload` to every peer reachable in the current Wi-Fi role
///
/// - Off: nothing is sent.
/// - Station: one datagram to the subnet broadcast address.
/// - Access point: one datagram per associated station.
///
/// The serial input is disabled for the duration of each send and
/// re-enabled afterwards. A missing socket or a failed send only loses
/// that datagram. Returns the number of datagrams handed to the socket.
pub fn transmit_udp<W, S, G>(
    wifi: &mut W,
    mut socket: Option<&mut S>,
    gate: &mut G,
    port: u16,
    payload: &[u8],
) -> usize
where
    W: WifiDriver,
    S: DatagramSocket,
    G: SerialInput,
{
    let mut sent = 0;

    match wifi.role() {
        WifiRole::Off => {}
        WifiRole::Station => {
            let info = wifi.ip_info(Interface::Station);
            let dest = broadcast_address(info.address, info.netmask);
            sent += send_one(socket.as_deref_mut(), gate, dest, port, payload);
        }
        WifiRole::AccessPoint => {
            // The station list is held only for the duration of the loop
            for dest in wifi.stations() {
                sent += send_one(socket.as_deref_mut(), gate, dest, port, payload);
            }
        }
    }

    sent
}

fn send_one<S, G>(
    socket: Option<&mut S>,
    gate: &mut G,
    dest: Ipv4Addr,
    port: u16,
    payload: &[u8],
) -> usize
where
    S: DatagramSocket,
    G: SerialInput,
{
    gate.enable_rx(false);

    let attempted = match socket {
        Some(socket) => {
            if socket.send_to(dest, port, payload).is_err() {
                #[cfg(feature = "defmt")]
                defmt::trace!("udp send to {} failed", u32::from(dest));
            }
            1
        }
        None => 0,
    };

    gate.enable_rx(true);
    attempted
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use proptest::prelude::*;
    use vigil_hal::{Ipv4Info, SerialConfig};

    struct MockWifi {
        role: WifiRole,
        sta: Ipv4Info,
        stations: Vec<Ipv4Addr, 8>,
        lists_taken: usize,
    }

    impl MockWifi {
        fn new(role: WifiRole) -> Self {
            Self {
                role,
                sta: Ipv4Info::new(
                    Ipv4Addr::new(192, 168, 1, 17),
                    Ipv4Addr::new(255, 255, 255, 0),
                ),
                stations: Vec::new(),
                lists_taken: 0,
            }
        }
    }

    impl WifiDriver for MockWifi {
        type Stations<'a> = core::iter::Copied<core::slice::Iter<'a, Ipv4Addr>>;

        fn role(&self) -> WifiRole {
            self.role
        }

        fn ip_info(&self, _interface: Interface) -> Ipv4Info {
            self.sta
        }

        fn stations(&mut self) -> Self::Stations<'_> {
            self.lists_taken += 1;
            self.stations.iter().copied()
        }

        fn set_output_power(&mut self, _dbm: f32) {}

        fn set_dhcp_lease_time(&mut self, _seconds: u32) {}

        fn set_hostname(&mut self, _hostname: &str) -> bool {
            true
        }
    }

    /// Records each send together with the gate state at the time
    struct MockSocket<'g> {
        sent: Vec<(Ipv4Addr, u16, bool), 8>,
        gate_probe: &'g core::cell::Cell<bool>,
        fail: bool,
    }

    impl DatagramSocket for MockSocket<'_> {
        type Error = ();

        fn send_to(&mut self, addr: Ipv4Addr, port: u16, _payload: &[u8]) -> Result<(), ()> {
            let _ = self.sent.push((addr, port, self.gate_probe.get()));
            if self.fail {
                Err(())
            } else {
                Ok(())
            }
        }

        fn stop_all(&mut self) {}
    }

    struct MockGate<'g> {
        rx: &'g core::cell::Cell<bool>,
        toggles: usize,
    }

    impl SerialInput for MockGate<'_> {
        fn begin(&mut self, _config: SerialConfig) {}

        fn enable_rx(&mut self, enabled: bool) {
            self.rx.set(enabled);
            self.toggles += 1;
        }

        fn is_rx_enabled(&self) -> bool {
            self.rx.get()
        }
    }

    fn rig(cell: &core::cell::Cell<bool>) -> (MockSocket<'_>, MockGate<'_>) {
        (
            MockSocket {
                sent: Vec::new(),
                gate_probe: cell,
                fail: false,
            },
            MockGate { rx: cell, toggles: 0 },
        )
    }

    #[test]
    fn test_off_sends_nothing() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::Off);

        let n = transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 4000, b"x");

        assert_eq!(n, 0);
        assert!(socket.sent.is_empty());
        assert_eq!(gate.toggles, 0);
    }

    #[test]
    fn test_station_sends_subnet_broadcast() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::Station);

        let n = transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 4000, b"x");

        assert_eq!(n, 1);
        assert_eq!(
            socket.sent.as_slice(),
            &[(Ipv4Addr::new(192, 168, 1, 255), 4000, false)]
        );
        assert!(cell.get());
        assert_eq!(wifi.lists_taken, 0);
    }

    #[test]
    fn test_access_point_sends_per_station() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::AccessPoint);
        let _ = wifi.stations.push(Ipv4Addr::new(192, 168, 4, 2));
        let _ = wifi.stations.push(Ipv4Addr::new(192, 168, 4, 3));

        let n = transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 10110, b"$GPRMC");

        assert_eq!(n, 2);
        assert_eq!(socket.sent.len(), 2);
        // Reception was paused during every send and resumed after each
        assert!(socket.sent.iter().all(|&(_, _, rx)| !rx));
        assert_eq!(gate.toggles, 4);
        assert!(cell.get());
        assert_eq!(wifi.lists_taken, 1);
    }

    #[test]
    fn test_station_on_access_point_subnet() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::Station);
        wifi.sta = Ipv4Info::new(
            Ipv4Addr::new(192, 168, 4, 2),
            Ipv4Addr::new(255, 255, 255, 0),
        );

        let n = transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 4000, b"x");

        assert_eq!(n, 1);
        assert_eq!(
            socket.sent.as_slice(),
            &[(Ipv4Addr::new(192, 168, 4, 255), 4000, false)]
        );
        assert_eq!(gate.toggles, 2);
        assert!(cell.get());
    }

    #[test]
    fn test_access_point_single_peer() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::AccessPoint);
        let _ = wifi.stations.push(Ipv4Addr::new(192, 168, 4, 2));

        let n = transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 4000, b"x");

        // Peers get unicast, never the subnet broadcast
        assert_eq!(n, 1);
        assert_eq!(
            socket.sent.as_slice(),
            &[(Ipv4Addr::new(192, 168, 4, 2), 4000, false)]
        );
        assert_eq!(gate.toggles, 2);
        assert!(cell.get());
    }

    #[test]
    fn test_access_point_without_peers() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::AccessPoint);

        assert_eq!(transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 1, b""), 0);
        assert_eq!(gate.toggles, 0);
    }

    #[test]
    fn test_missing_socket_still_toggles_gate() {
        let cell = core::cell::Cell::new(true);
        let (_, mut gate) = rig(&cell);
        let mut wifi = MockWifi::new(WifiRole::Station);

        let n = transmit_udp::<_, MockSocket<'_>, _>(&mut wifi, None, &mut gate, 4000, b"x");

        assert_eq!(n, 0);
        assert_eq!(gate.toggles, 2);
        assert!(cell.get());
    }

    #[test]
    fn test_send_error_swallowed() {
        let cell = core::cell::Cell::new(true);
        let (mut socket, mut gate) = rig(&cell);
        socket.fail = true;
        let mut wifi = MockWifi::new(WifiRole::AccessPoint);
        let _ = wifi.stations.push(Ipv4Addr::new(10, 0, 0, 2));
        let _ = wifi.stations.push(Ipv4Addr::new(10, 0, 0, 3));

        let n = transmit_udp(&mut wifi, Some(&mut socket), &mut gate, 4000, b"x");

        assert_eq!(n, 2);
        assert!(cell.get());
    }

    #[test]
    fn test_broadcast_address_examples() {
        assert_eq!(
            broadcast_address(Ipv4Addr::new(192, 168, 1, 17), Ipv4Addr::new(255, 255, 255, 0)),
            Ipv4Addr::new(192, 168, 1, 255)
        );
        assert_eq!(
            broadcast_address(Ipv4Addr::new(192, 168, 4, 2), Ipv4Addr::new(255, 255, 255, 0)),
            Ipv4Addr::new(192, 168, 4, 255)
        );
        assert_eq!(
            broadcast_address(Ipv4Addr::new(10, 1, 2, 3), Ipv4Addr::new(255, 0, 0, 0)),
            Ipv4Addr::new(10, 255, 255, 255)
        );
    }

    proptest! {
        #[test]
        fn prop_broadcast_keeps_network_sets_host(addr in any::<u32>(), prefix in 0u32..=32) {
            let mask = if prefix == 0 { 0 } else { u32::MAX << (32 - prefix) };
            let bcast = u32::from(broadcast_address(Ipv4Addr::from(addr), Ipv4Addr::from(mask)));
            prop_assert_eq!(bcast & mask, addr & mask);
            prop_assert_eq!(bcast | mask, u32::MAX);
        }
    }
}
