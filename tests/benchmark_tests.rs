//! Performance benchmarks for critical game systems

use client::game::ClientWorld;
use rand::{rngs::StdRng, Rng, SeedableRng};
use server::network::fan_out;
use server::physics::{PhysicsWorld, Vector2};
use shared::{
    InputFlags, ServerPacket, SlotPose, Snapshot, DT, INTERPOLATION_FACTOR, MAX_PLAYERS, SPAWN_X,
    SPAWN_Y,
};
use std::time::Instant;
use tokio::net::UdpSocket;

fn random_snapshot(rng: &mut StdRng) -> Snapshot {
    let mut snapshot = Snapshot::default();
    for pose in snapshot.slots.iter_mut() {
        *pose = SlotPose {
            x: rng.gen_range(0.0..800.0),
            y: rng.gen_range(0.0..600.0),
            angle: rng.gen_range(-10.0..10.0),
        };
    }
    snapshot
}

/// Benchmarks world-state encoding and decoding
#[test]
fn benchmark_snapshot_codec() {
    let mut rng = StdRng::seed_from_u64(42);
    let packet = ServerPacket::WorldState(random_snapshot(&mut rng));

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let bytes = packet.encode().unwrap();
        let decoded = ServerPacket::decode(&bytes).unwrap();
        assert_eq!(decoded, packet);
    }

    let duration = start.elapsed();
    println!(
        "Snapshot codec: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds even in debug builds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks a full physics step with every slot occupied
#[test]
fn benchmark_physics_step() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut world = PhysicsWorld::new(DT, Vector2::new(SPAWN_X, SPAWN_Y));
    for slot in 0..MAX_PLAYERS {
        world.add_body(slot);
    }

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        for slot in 0..MAX_PLAYERS {
            world.apply_input(slot, InputFlags::from_bits(rng.gen_range(0..8)));
        }
        world.step();
    }

    let duration = start.elapsed();
    println!(
        "Physics step: {} ticks in {:?} ({:.2} μs/tick)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    for slot in 0..MAX_PLAYERS {
        let pose = world.pose(slot).unwrap();
        assert!(pose.x.is_finite() && pose.y.is_finite() && pose.angle.is_finite());
    }

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks per-frame interpolation with fresh targets every other frame
#[test]
fn benchmark_interpolation() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut world = ClientWorld::new(INTERPOLATION_FACTOR);

    let iterations = 100_000;
    let start = Instant::now();

    for frame in 0..iterations {
        if frame % 2 == 0 {
            world.apply_snapshot(&random_snapshot(&mut rng));
        }
        world.advance();
    }

    let duration = start.elapsed();
    println!(
        "Interpolation: {} frames in {:?} ({:.2} ns/frame)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert_eq!(world.snapshots_received, iterations / 2);

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks broadcasting a world state to a full server's worth of clients
#[test]
fn benchmark_broadcast_fan_out() {
    tokio_test::block_on(async {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let mut receivers = Vec::new();
        for _ in 0..MAX_PLAYERS {
            receivers.push(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        }
        let targets: Vec<_> = receivers.iter().map(|r| r.local_addr().unwrap()).collect();
        let payload = ServerPacket::WorldState(Snapshot::default())
            .encode()
            .unwrap();

        let iterations = 1_000;
        let start = Instant::now();

        let mut delivered = 0;
        for _ in 0..iterations {
            delivered += fan_out(&server, &payload, &targets).await;
        }

        let duration = start.elapsed();
        println!(
            "Broadcast fan-out: {} rounds in {:?} ({:.2} μs/round)",
            iterations,
            duration,
            duration.as_micros() as f64 / iterations as f64
        );

        assert_eq!(delivered, iterations * MAX_PLAYERS);

        // Should complete in under 2 seconds
        assert!(duration.as_millis() < 2000);
    });
}
