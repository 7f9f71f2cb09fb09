use clap::Parser;
use log::{debug, info};
use peer::node::Node;
use peer::session::Phase;
use peer::transport::{LinkEvent, LinkTransport};
use rand::Rng;
use shared::{SoundTrigger, PADDLE_HEIGHT, SCREEN_HEIGHT};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

/// One peer of the two-node pong session.
///
/// Runs headless with a stand-in collaborator that votes ready, holds the
/// serve button, and tracks the ball — real input, rendering, and audio
/// read and feed the node through its public interface instead. Two
/// processes on one machine need distinct ports:
///
/// ```text
/// peer --port 43210 --broadcast-port 43211
/// peer --port 43211 --broadcast-port 43210
/// ```
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// UDP port to bind
    #[clap(short, long, default_value = "43210")]
    port: u16,
    /// UDP port the partner listens on (Discovery broadcast destination)
    #[clap(short, long, default_value = "43210")]
    broadcast_port: u16,
    /// Simulation tick rate (ticks per second)
    #[clap(short, long, default_value = "30")]
    tick_rate: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let transport = LinkTransport::bind(args.port, args.broadcast_port).await?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    transport.spawn_receiver(event_tx);
    transport.spawn_sender(out_rx);

    let nonce: u8 = rand::thread_rng().gen();
    let mut node = Node::new(nonce, out_tx);
    info!("Peer starting (nonce {})", nonce);

    let mut ticker = interval(Duration::from_secs_f32(1.0 / args.tick_rate as f32));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(LinkEvent::Datagram { from, data }) => {
                    node.handle_packet(from, &data, Instant::now());
                }
                None => {
                    info!("Link receiver gone, shutting down");
                    break;
                }
            },

            _ = ticker.tick() => {
                drive_collaborators(&mut node);
                node.tick(Instant::now());
                let sound = node.take_local_sound();
                if sound != SoundTrigger::None {
                    debug!("Sound trigger: {:?}", sound);
                }
            },
        }
    }

    Ok(())
}

/// Stand-in for the real input collaborator: vote ready as soon as the
/// session allows, keep the serve button held, and track the ball.
fn drive_collaborators(node: &mut Node) {
    match node.phase() {
        Phase::Searching => {}
        Phase::Ready => node.set_ready(),
        Phase::Playing => {
            let target = node.world().ball_y - PADDLE_HEIGHT / 2;
            let target = target.clamp(0, SCREEN_HEIGHT - PADDLE_HEIGHT);
            node.set_paddle(target as i8);
            node.set_click(true);
        }
    }
}
