//! Server network layer handling UDP communications and the simulation loop

use crate::game::GameState;
use log::{debug, error, info, warn};
use shared::ServerPacket;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// Messages sent from the receiver task to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    DatagramReceived { data: Vec<u8>, addr: SocketAddr },
}

/// Messages sent from the main server loop to the sender task
#[derive(Debug)]
pub enum GameMessage {
    SendPacket {
        payload: Vec<u8>,
        addr: SocketAddr,
    },
    BroadcastPacket {
        payload: Vec<u8>,
        targets: Vec<SocketAddr>,
    },
}

/// Sends `payload` to every target, one datagram each.
///
/// A failed send is logged and skipped so the remaining targets still get
/// the packet. Returns how many sends succeeded.
pub async fn fan_out(socket: &UdpSocket, payload: &[u8], targets: &[SocketAddr]) -> usize {
    let mut delivered = 0;
    for addr in targets {
        match socket.send_to(payload, addr).await {
            Ok(_) => delivered += 1,
            Err(e) => warn!("Failed to send to {}: {}", addr, e),
        }
    }
    delivered
}

/// Main server coordinating networking and game simulation
///
/// All game state lives on the task running [`Server::run`]; the receiver and
/// sender tasks only move bytes through channels, so a tick always sees the
/// controls from the last fully handled datagram.
pub struct Server {
    socket: Arc<UdpSocket>,
    game_state: GameState,
    tick_duration: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: Option<mpsc::UnboundedReceiver<GameMessage>>,
}

impl Server {
    /// Binds the socket; the simulation step is the reciprocal of `tick_rate`.
    pub async fn new(addr: &str, tick_rate: u32) -> Result<Self, Box<dyn std::error::Error>> {
        if tick_rate == 0 {
            return Err("tick rate must be at least 1".into());
        }

        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        let dt = 1.0 / tick_rate as f32;
        Ok(Server {
            socket,
            game_state: GameState::new(dt),
            tick_duration: Duration::from_secs_f32(dt),
            server_tx,
            server_rx,
            game_tx,
            game_rx: Some(game_rx),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that continuously listens for incoming datagrams
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        let data = buffer[..len].to_vec();
                        if let Err(e) = server_tx.send(ServerMessage::DatagramReceived { data, addr })
                        {
                            error!("Failed to send datagram to main loop: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        // ICMP errors from departed clients surface here on some platforms.
                        error!("Error receiving datagram: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that processes the outgoing packet queue
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let Some(mut game_rx) = self.game_rx.take() else {
            return;
        };

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { payload, addr } => {
                        if let Err(e) = socket.send_to(&payload, addr).await {
                            warn!("Failed to send to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { payload, targets } => {
                        fan_out(&socket, &payload, &targets).await;
                    }
                }
            }
        });
    }

    fn queue(&self, message: GameMessage) {
        if let Err(e) = self.game_tx.send(message) {
            error!("Failed to queue outgoing packet: {}", e);
        }
    }

    fn send_packet(&self, packet: &ServerPacket, addr: SocketAddr) {
        match packet.encode() {
            Ok(payload) => self.queue(GameMessage::SendPacket { payload, addr }),
            Err(e) => error!("Failed to encode packet for {}: {}", addr, e),
        }
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::DatagramReceived { data, addr } => {
                if let Some(reply) = self.game_state.handle_datagram(addr, &data) {
                    self.send_packet(&reply, addr);
                }
            }
        }
    }

    /// Steps the simulation once and broadcasts the world state
    fn run_tick(&mut self) {
        let snapshot = self.game_state.step();

        let targets = self.game_state.endpoints();
        if targets.is_empty() {
            return;
        }

        match ServerPacket::WorldState(snapshot).encode() {
            Ok(payload) => self.queue(GameMessage::BroadcastPacket { payload, targets }),
            Err(e) => error!("Failed to encode world state: {}", e),
        }

        if self.game_state.tick % 300 == 0 {
            debug!(
                "Tick {}: {} clients",
                self.game_state.tick,
                self.game_state.registry().len()
            );
        }
    }

    /// Main server loop; runs until the receiver task goes away
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Server started, ticking every {:.1}ms",
            self.tick_duration.as_secs_f32() * 1000.0
        );

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!("Receiver closed, server stopping");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    self.run_tick();
                },
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_server_message_creation() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        let msg = ServerMessage::DatagramReceived {
            data: vec![0x01, 0x01],
            addr,
        };

        match msg {
            ServerMessage::DatagramReceived { data, addr: a } => {
                assert_eq!(a, addr);
                assert_eq!(data, vec![0x01, 0x01]);
            }
        }
    }

    #[test]
    fn test_channel_communication() {
        let (tx, mut rx) = mpsc::unbounded_channel::<GameMessage>();
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)), 9090);

        assert!(tx
            .send(GameMessage::SendPacket {
                payload: vec![0x02, 0x00],
                addr,
            })
            .is_ok());

        match rx.try_recv() {
            Ok(GameMessage::SendPacket { payload, addr: a }) => {
                assert_eq!(a, addr);
                assert_eq!(payload, vec![0x02, 0x00]);
            }
            other => panic!("Unexpected message {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_new_rejects_zero_tick_rate() {
        assert!(Server::new("127.0.0.1:0", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_new_binds_ephemeral_port() {
        let server = Server::new("127.0.0.1:0", 30).await.unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(server.tick_duration, Duration::from_secs_f32(1.0 / 30.0));
    }

    #[tokio::test]
    async fn test_fan_out_skips_failed_sends() {
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let first = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let second = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        // An IPv6 target cannot be reached from an IPv4 socket, so that send fails.
        let unreachable: SocketAddr = "[::1]:9".parse().unwrap();
        let targets = vec![
            first.local_addr().unwrap(),
            unreachable,
            second.local_addr().unwrap(),
        ];

        let delivered = fan_out(&sender, &[0x03, 0xaa], &targets).await;
        assert_eq!(delivered, 2);

        let mut buffer = [0u8; 16];
        for socket in [&first, &second] {
            let len = tokio::time::timeout(Duration::from_secs(1), socket.recv(&mut buffer))
                .await
                .expect("timed out")
                .unwrap();
            assert_eq!(&buffer[..len], &[0x03, 0xaa]);
        }
    }

    #[tokio::test]
    async fn test_run_tick_without_clients_sends_nothing() {
        let mut server = Server::new("127.0.0.1:0", 30).await.unwrap();
        server.run_tick();
        assert_eq!(server.game_state.tick, 1);

        let mut game_rx = server.game_rx.take().unwrap();
        assert!(game_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_first_datagram_queues_assignment_then_broadcast() {
        let mut server = Server::new("127.0.0.1:0", 30).await.unwrap();
        let client: SocketAddr = "127.0.0.1:45000".parse().unwrap();

        server.handle_message(ServerMessage::DatagramReceived {
            data: vec![0x01, 0b001],
            addr: client,
        });
        server.run_tick();

        let mut game_rx = server.game_rx.take().unwrap();
        match game_rx.try_recv() {
            Ok(GameMessage::SendPacket { payload, addr }) => {
                assert_eq!(addr, client);
                assert_eq!(payload, vec![0x02, 0x00]);
            }
            other => panic!("Unexpected message {:?}", other),
        }
        match game_rx.try_recv() {
            Ok(GameMessage::BroadcastPacket { payload, targets }) => {
                assert_eq!(targets, vec![client]);
                match ServerPacket::decode(&payload).unwrap() {
                    ServerPacket::WorldState(snapshot) => {
                        assert!(snapshot.slots[0].x > shared::SPAWN_X)
                    }
                    other => panic!("Unexpected packet {:?}", other),
                }
            }
            other => panic!("Unexpected message {:?}", other),
        }
    }
}
