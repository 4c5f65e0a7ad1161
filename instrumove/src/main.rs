//! instrumove — scripted demo entry point.
//!
//! Without tracking hardware attached, replays a short scripted performance
//! (a four-beat count-in, then arm movement) through the full engine and
//! sends the resulting notes to the configured OSC destination.

use std::sync::Arc;
use std::time::Duration;

use joint_stream::{JointId, Point3};
use osc_link::{NullTransport, Transport, UdpTransport};

use instrumove::frame::{spawn_frame_source, BodyFrame, ScriptedFrameSource};
use instrumove::hand::{HandPair, HandState};
use instrumove::session::{run, Session};
use instrumove::SessionConfig;

fn main() {
    env_logger::init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║      Instrumove — motion-to-music OSC note controller        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let host = flag_value(&args, "--host").unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = flag_value(&args, "--port")
        .and_then(|p| p.parse().ok())
        .unwrap_or(osc_link::transport::DEFAULT_PORT);

    let transport: Arc<dyn Transport> = if dry_run {
        println!("  Transport: dry-run (messages discarded)");
        Arc::new(NullTransport)
    } else {
        match UdpTransport::new(&host, port) {
            Ok(t) => {
                println!("  Transport: OSC/UDP → {host}:{port}");
                Arc::new(t)
            }
            Err(e) => {
                eprintln!("  Could not open UDP socket ({e}) — falling back to dry-run");
                Arc::new(NullTransport)
            }
        }
    };
    println!();
    println!("  Replaying scripted performance: 4-beat count-in, then arm movement…");
    println!();

    let mut session = Session::new(SessionConfig::default(), transport);
    let rx = spawn_frame_source(ScriptedFrameSource::new(
        demo_script(),
        Duration::from_millis(33),
    ));
    run(&mut session, rx);

    println!("  Done.");
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

// ════════════════════════════════════════════════════════════════════════════
// Scripted performance
// ════════════════════════════════════════════════════════════════════════════

/// Baseline skeleton: every default-pair joint at rest.
fn still_frame(t_ms: f64, hands: HandPair) -> BodyFrame {
    let mut f = BodyFrame::new(t_ms).with_hands(hands);
    for pair in instrumove::config::default_pairs() {
        f = f
            .with_joint(pair.steady, Point3::default())
            .with_joint(pair.moving, Point3::default());
    }
    f
}

/// Count-in with stressed-beat gestures, then fast and slow left-arm
/// movement, then the silence gesture.
fn demo_script() -> Vec<BodyFrame> {
    let mut frames = Vec::new();
    let mut t_ms = 0.0;

    // Four stressed beats, 500 ms apart (establishes ~120 BPM).
    for _ in 0..4 {
        frames.push(still_frame(t_ms, HandPair::closed()));
        frames.push(still_frame(
            t_ms + 100.0,
            HandPair::new(HandState::Closed, HandState::Open),
        ));
        t_ms += 500.0;
    }

    // Fast left-hand sweep: ~3 m/s relative to the shoulder, rising.
    let mut x = 0.0;
    for i in 0..30 {
        let mut f = still_frame(t_ms, HandPair::new(HandState::Open, HandState::Unknown));
        f.joints
            .insert(JointId::HandLeft, Point3::new(x, i as f64 * 0.02, 0.5));
        frames.push(f);
        x += 0.10; // 0.10 m per 33 ms ≈ 3 m/s
        t_ms += 33.0;
    }

    // Slow drift: ~0.5 m/s, sustained voice territory.
    for _ in 0..30 {
        let mut f = still_frame(t_ms, HandPair::new(HandState::Open, HandState::Unknown));
        f.joints.insert(JointId::HandLeft, Point3::new(x, 0.3, 0.5));
        frames.push(f);
        x += 0.017;
        t_ms += 33.0;
    }

    // Silence gesture, held a few frames.
    for _ in 0..5 {
        frames.push(still_frame(t_ms, HandPair::closed()));
        t_ms += 33.0;
    }

    frames
}
