//! UDP adapter for the unreliable broadcast link.
//!
//! Two tasks around one socket: a receiver that forwards raw datagrams to
//! the node's single logic task over an mpsc channel, and a sender that
//! drains the node's outgoing queue. Sends are best-effort; failures are
//! logged and forgotten, matching the link's no-retry contract.

use crate::node::Outgoing;
use log::{error, info};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Largest protocol packet is 8 bytes; anything longer is link padding.
const RECV_BUFFER_SIZE: usize = 64;

/// Raw events delivered from the link to the node's logic task.
#[derive(Debug)]
pub enum LinkEvent {
    Datagram { from: SocketAddr, data: Vec<u8> },
}

pub struct LinkTransport {
    socket: Arc<UdpSocket>,
    broadcast_dest: SocketAddr,
}

impl LinkTransport {
    /// Binds the local port and enables broadcast. `broadcast_port` is the
    /// port Discovery beacons are addressed to — the partner's bind port.
    pub async fn bind(
        port: u16,
        broadcast_port: u16,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
        socket.set_broadcast(true)?;
        info!("Link bound on port {}", port);
        Ok(Self {
            socket: Arc::new(socket),
            broadcast_dest: SocketAddr::from((Ipv4Addr::BROADCAST, broadcast_port)),
        })
    }

    /// Spawns the task that forwards every received datagram to the logic
    /// task. Decoding and validation happen there, on the single consumer.
    pub fn spawn_receiver(&self, events: mpsc::UnboundedSender<LinkEvent>) {
        let socket = Arc::clone(&self.socket);

        tokio::spawn(async move {
            let mut buffer = [0u8; RECV_BUFFER_SIZE];
            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, from)) => {
                        let event = LinkEvent::Datagram {
                            from,
                            data: buffer[..len].to_vec(),
                        };
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error receiving datagram: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the outgoing queue. Every send is
    /// fire-and-forget with no delivery confirmation.
    pub fn spawn_sender(&self, mut outgoing: mpsc::UnboundedReceiver<Outgoing>) {
        let socket = Arc::clone(&self.socket);
        let broadcast_dest = self.broadcast_dest;

        tokio::spawn(async move {
            while let Some(message) = outgoing.recv().await {
                let (dest, packet) = match message {
                    Outgoing::Unicast { dest, packet } => (dest, packet),
                    Outgoing::Broadcast { packet } => (broadcast_dest, packet),
                };
                if let Err(e) = socket.send_to(&packet.encode(), dest).await {
                    error!("Failed to send to {}: {}", dest, e);
                }
            }
        });
    }
}
