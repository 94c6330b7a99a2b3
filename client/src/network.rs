//! Client network worker
//!
//! Reception runs on its own OS thread with a current-thread tokio runtime,
//! separate from the macroquad frame loop. The two sides meet only at the
//! [`SharedWorld`] mutex, held just long enough to copy scalar targets.

use crate::game::SharedWorld;
use log::{debug, error, info, warn};
use shared::{ClientPacket, ServerPacket};
use std::net::SocketAddr;
use std::sync::PoisonError;
use std::thread;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};

/// Decodes one server datagram and applies it to the shared world.
///
/// Unknown tags and wrong lengths are dropped.
pub fn handle_datagram(world: &SharedWorld, data: &[u8]) {
    let packet = match ServerPacket::decode(data) {
        Ok(packet) => packet,
        Err(e) => {
            debug!("Dropping server datagram: {}", e);
            return;
        }
    };

    if let ServerPacket::SlotAssigned { slot } = packet {
        info!("Assigned slot {}", slot);
    }

    let mut world = world.lock().unwrap_or_else(PoisonError::into_inner);
    world.apply_packet(&packet);
}

/// Handle for sending input to the server
///
/// Only exists once the worker's socket is bound and connected.
pub struct NetworkClient {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    local_addr: SocketAddr,
    server_addr: SocketAddr,
}

impl NetworkClient {
    /// Starts the network worker and waits until its socket is ready
    pub fn connect(
        server_addr: SocketAddr,
        world: SharedWorld,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let socket = match open_socket(server_addr).await {
                        Ok(socket) => socket,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                    let local_addr = socket.local_addr();
                    if ready_tx.send(local_addr).is_err() {
                        return;
                    }
                    run_worker(socket, world, outbound_rx).await;
                });
            })?;

        let local_addr = ready_rx.blocking_recv()??;
        info!("Connected to server {} from {}", server_addr, local_addr);

        Ok(NetworkClient {
            outbound,
            local_addr,
            server_addr,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    /// Queues a packet for the worker; no acknowledgement, no retry.
    pub fn send(&self, packet: &ClientPacket) {
        if let Err(e) = self.outbound.send(packet.encode()) {
            warn!("Network worker gone, dropping input: {}", e);
        }
    }
}

async fn open_socket(server_addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let bind_addr: SocketAddr = if server_addr.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server_addr).await?;
    Ok(socket)
}

async fn run_worker(
    socket: UdpSocket,
    world: SharedWorld,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    let mut buffer = [0u8; 2048];

    loop {
        tokio::select! {
            result = socket.recv(&mut buffer) => {
                match result {
                    Ok(len) => handle_datagram(&world, &buffer[..len]),
                    Err(e) => {
                        // Connected UDP sockets report ICMP refusals here while the server is down.
                        error!("Network error: {}", e);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            },

            payload = outbound.recv() => {
                match payload {
                    Some(payload) => {
                        if let Err(e) = socket.send(&payload).await {
                            warn!("Failed to send input: {}", e);
                        }
                    }
                    None => {
                        debug!("Input channel closed, stopping network worker");
                        break;
                    }
                }
            },
        }
    }
}
