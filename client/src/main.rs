use clap::Parser;
use client::game::{ClientWorld, WINDOW_HEIGHT, WINDOW_WIDTH};
use client::input::InputSampler;
use client::network::NetworkClient;
use client::rendering::{RenderConfig, Renderer};
use log::{error, info};
use macroquad::time::get_frame_time;
use macroquad::window::{next_frame, Conf};
use shared::{INTERPOLATION_FACTOR, SEND_INTERVAL};
use std::net::SocketAddr;
use std::sync::PoisonError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:9999")]
    server: SocketAddr,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Rider".to_owned(),
        window_width: WINDOW_WIDTH as i32,
        window_height: WINDOW_HEIGHT as i32,
        window_resizable: false,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let server_addr = args.server;

    info!("Starting client...");
    info!("Connecting to: {}", server_addr);
    info!("Controls: Up to accelerate, Left/Right to steer");

    let world = ClientWorld::shared(INTERPOLATION_FACTOR);
    let network = match NetworkClient::connect(server_addr, world.clone()) {
        Ok(network) => Some(network),
        Err(e) => {
            error!("Failed to start networking: {}", e);
            None
        }
    };

    let mut sampler = InputSampler::new(SEND_INTERVAL);
    let mut renderer = Renderer::new(WINDOW_WIDTH, WINDOW_HEIGHT);

    loop {
        sampler.poll_keyboard();

        let (poses, config) = {
            let mut world = world.lock().unwrap_or_else(PoisonError::into_inner);
            world.advance();
            let config = RenderConfig {
                local_slot: world.local_slot,
                connected: network.is_some(),
                snapshots_received: world.snapshots_received,
            };
            (world.poses(), config)
        };

        if let Some(packet) = sampler.update(get_frame_time()) {
            if let Some(network) = &network {
                network.send(&packet);
            }
        }

        renderer.render(&poses, config);
        next_frame().await;
    }
}
