//! Wi-Fi capability group

use vigil_core::broadcast;
use vigil_core::soc::{WifiOps, WifiParam};
use vigil_hal::{DatagramSocket, WifiDriver, WifiRole};

use super::{Esp8266Board, Esp8266Soc};

impl<B: Esp8266Board> WifiOps for Esp8266Soc<B> {
    fn set_param(&mut self, param: WifiParam) {
        match param {
            WifiParam::TxPower(dbm) => self.wifi.set_output_power(dbm),
            WifiParam::DhcpLeaseMinutes(minutes) => {
                // Lease time only exists for clients of our own access point
                if self.wifi.role() == WifiRole::AccessPoint {
                    self.wifi.set_dhcp_lease_time(minutes.saturating_mul(60));
                }
            }
        }
    }

    fn transmit_udp(&mut self, port: u16, payload: &[u8]) -> usize {
        broadcast::transmit_udp(
            &mut self.wifi,
            self.socket.as_mut(),
            &mut self.gnss,
            port,
            payload,
        )
    }

    fn stop_all(&mut self) {
        if let Some(socket) = self.socket.as_mut() {
            socket.stop_all();
        }
    }

    fn set_hostname(&mut self, hostname: &str) -> bool {
        self.wifi.set_hostname(hostname)
    }

    fn clients_count(&mut self) -> Option<usize> {
        match self.wifi.role() {
            WifiRole::AccessPoint => Some(self.wifi.stations().count()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::*;
    use super::super::Esp8266Config;
    use super::*;
    use core::net::Ipv4Addr;
    use vigil_core::soc::Soc;

    fn access_point() -> Esp8266Soc<TestBoard> {
        let mut parts = board();
        parts.wifi.role = WifiRole::AccessPoint;
        let _ = parts.wifi.stations.push(Ipv4Addr::new(192, 168, 4, 2));
        let _ = parts.wifi.stations.push(Ipv4Addr::new(192, 168, 4, 3));
        let _ = parts.wifi.stations.push(Ipv4Addr::new(192, 168, 4, 4));
        soc_with(parts, Esp8266Config::default())
    }

    #[test]
    fn test_station_broadcast() {
        let mut soc = soc_with(board(), Esp8266Config::default());

        let n = soc.transmit_udp(10110, b"$PFLAU");

        assert_eq!(n, 1);
        let socket = soc.socket.as_ref().unwrap();
        assert_eq!(
            socket.sent.as_slice(),
            &[(Ipv4Addr::new(192, 168, 1, 255), 10110)]
        );
        assert_eq!(soc.gnss.toggles, 2);
        assert!(soc.gnss.rx);
    }

    #[test]
    fn test_access_point_unicast_to_each_station() {
        let mut soc = access_point();

        assert_eq!(soc.transmit_udp(4000, b"x"), 3);
        assert_eq!(soc.socket.as_ref().unwrap().sent.len(), 3);
        assert_eq!(soc.gnss.toggles, 6);
        assert!(soc.gnss.rx);
    }

    #[test]
    fn test_unbound_socket() {
        let mut soc = access_point();
        soc.set_socket(None);

        assert_eq!(soc.transmit_udp(4000, b"x"), 0);
        assert!(soc.gnss.rx);
    }

    #[test]
    fn test_wifi_off() {
        let mut parts = board();
        parts.wifi.role = WifiRole::Off;
        let mut soc = soc_with(parts, Esp8266Config::default());

        assert_eq!(soc.transmit_udp(4000, b"x"), 0);
        assert_eq!(soc.gnss.toggles, 0);
        assert_eq!(soc.clients_count(), None);
    }

    #[test]
    fn test_clients_count() {
        let mut sta = soc_with(board(), Esp8266Config::default());
        assert_eq!(sta.clients_count(), None);

        let mut ap = access_point();
        assert_eq!(ap.clients_count(), Some(3));

        let mut parts = board();
        parts.wifi.role = WifiRole::AccessPoint;
        let mut empty = soc_with(parts, Esp8266Config::default());
        assert_eq!(empty.clients_count(), Some(0));
    }

    #[test]
    fn test_dhcp_lease_only_in_ap_mode() {
        let mut sta = soc_with(board(), Esp8266Config::default());
        sta.set_param(WifiParam::DhcpLeaseMinutes(5));
        assert_eq!(sta.wifi.lease_s, None);

        let mut ap = access_point();
        ap.set_param(WifiParam::DhcpLeaseMinutes(5));
        assert_eq!(ap.wifi.lease_s, Some(300));
    }

    #[test]
    fn test_tx_power() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        soc.set_param(WifiParam::TxPower(17.5));
        assert_eq!(soc.wifi.power_dbm, Some(17.5));
    }

    #[test]
    fn test_hostname_and_stop() {
        let mut soc = soc_with(board(), Esp8266Config::default());
        assert!(soc.set_hostname("vigil-1234fd"));

        if let Some(wifi) = soc.wifi() {
            wifi.stop_all();
        }
        assert!(soc.socket.as_ref().unwrap().stopped);
    }
}
