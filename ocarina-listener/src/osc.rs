//! # OSC Notifier Module
//!
//! Publishes recognised songs as OSC messages over UDP.

use ocarina_core::{DeliveryError, Notifier, SongEvent};
use rosc::{OscMessage, OscPacket, OscType};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};

/// Publishes song ids as OSC messages over UDP.
///
/// Each event becomes one message on the configured address carrying the
/// song id as a string, e.g. `/songID "1"`. Fire-and-forget.
pub struct OscNotifier {
    socket: UdpSocket,
    target: SocketAddr,
    address: String,
}

impl OscNotifier {
    pub fn new(target: &str, address: &str) -> std::io::Result<Self> {
        let target = target.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{target} did not resolve"),
            )
        })?;
        let bind = if target.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind)?;
        Ok(Self {
            socket,
            target,
            address: address.to_string(),
        })
    }

    fn encode(&self, event: &SongEvent) -> Result<Vec<u8>, rosc::OscError> {
        rosc::encoder::encode(&OscPacket::Message(OscMessage {
            addr: self.address.clone(),
            args: vec![OscType::String(event.song_id.to_string())],
        }))
    }
}

impl Notifier for OscNotifier {
    fn name(&self) -> &str {
        "osc"
    }

    fn publish(&self, event: &SongEvent) -> Result<(), DeliveryError> {
        let packet = self.encode(event)?;
        self.socket.send_to(&packet, self.target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn publishes_song_id_on_the_address() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let target = receiver.local_addr().unwrap().to_string();

        let notifier = OscNotifier::new(&target, "/songID").unwrap();
        notifier
            .publish(&SongEvent {
                song_id: 3,
                label: "Bolero of Fire".to_string(),
            })
            .unwrap();

        let mut buf = [0u8; rosc::decoder::MTU];
        let (len, _) = receiver.recv_from(&mut buf).unwrap();
        let (_, packet) = rosc::decoder::decode_udp(&buf[..len]).unwrap();
        match packet {
            OscPacket::Message(msg) => {
                assert_eq!(msg.addr, "/songID");
                assert_eq!(msg.args, vec![OscType::String("3".to_string())]);
            }
            other => panic!("unexpected packet {other:?}"),
        }
    }

    #[test]
    fn unresolvable_target_is_an_error() {
        assert!(OscNotifier::new("not an address", "/songID").is_err());
    }
}
