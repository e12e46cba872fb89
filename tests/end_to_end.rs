//! Full-stack tests: a real TCP client against the listener, with the
//! simulation tick loop running on its own thread.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use commands::{DriverConfig, TickDriver};
use net::BanList;
use session::SessionRegistry;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use world::MemoryWorld;

struct TestServer {
    addr: std::net::SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    tick_thread: Option<std::thread::JoinHandle<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let registry = Arc::new(Mutex::new(SessionRegistry::new()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(net::run_listener(
            listener,
            Arc::clone(&registry),
            BanList::empty(),
            shutdown_rx.clone(),
        ));

        let mut tick_shutdown = shutdown_rx;
        let tick_thread = std::thread::spawn(move || {
            let mut world = MemoryWorld::new();
            world.add_player("steve", false);
            let driver = TickDriver::new(DriverConfig::default());
            while !*tick_shutdown.borrow_and_update() {
                driver.tick(&mut registry.lock().unwrap(), &mut world, None);
                std::thread::sleep(Duration::from_millis(5));
            }
        });

        Self {
            addr,
            shutdown_tx,
            tick_thread: Some(tick_thread),
        }
    }

    fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.tick_thread.take() {
            let _ = handle.join();
        }
    }
}

async fn connect(server: &TestServer) -> BufReader<TcpStream> {
    BufReader::new(TcpStream::connect(server.addr).await.unwrap())
}

async fn send_line(client: &mut BufReader<TcpStream>, line: &str) {
    client
        .get_mut()
        .write_all(format!("{line}\n").as_bytes())
        .await
        .unwrap();
}

async fn read_reply(client: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    tokio::time::timeout(Duration::from_secs(2), client.read_line(&mut line))
        .await
        .expect("timed out waiting for reply")
        .unwrap();
    line.trim_end().to_string()
}

#[tokio::test]
async fn handshake_then_set_get_round_trip() {
    let server = TestServer::start().await;
    let mut client = connect(&server).await;

    send_line(&mut client, "setPlayer(steve,0,64,0)").await;
    assert_eq!(
        read_reply(&mut client).await,
        "Player steve set to location: 0, 64, 0 in world \"world\""
    );

    send_line(&mut client, "world.setBlock(1,0,2,STONE)").await;
    assert!(read_reply(&mut client).await.starts_with("Block STONE set successfully"));

    send_line(&mut client, "world.getBlock(1,0,2)").await;
    assert_eq!(read_reply(&mut client).await, "STONE");

    server.stop();
}

#[tokio::test]
async fn command_before_handshake_gets_error_then_disconnect() {
    let server = TestServer::start().await;
    let mut client = connect(&server).await;

    send_line(&mut client, "world.getBlock(0,0,0)").await;
    let reply = read_reply(&mut client).await;
    assert!(reply.starts_with(protocol::ERROR_PREFIX));
    assert!(reply.contains("setPlayer"));

    // The server closes the connection after the error is delivered.
    let mut rest = String::new();
    let n = tokio::time::timeout(Duration::from_secs(2), client.read_line(&mut rest))
        .await
        .expect("timed out waiting for close")
        .unwrap();
    assert_eq!(n, 0);

    server.stop();
}

#[tokio::test]
async fn unknown_command_keeps_session_usable() {
    let server = TestServer::start().await;
    let mut client = connect(&server).await;

    send_line(&mut client, "setPlayer(steve,0,64,0)").await;
    read_reply(&mut client).await;

    send_line(&mut client, "foo.bar(1,2)").await;
    assert_eq!(read_reply(&mut client).await, "Error: No such command: foo.bar");

    send_line(&mut client, "world.getBlock(0,0,0)").await;
    assert_eq!(read_reply(&mut client).await, "AIR");

    server.stop();
}

#[tokio::test]
async fn clients_see_only_their_own_replies() {
    let server = TestServer::start().await;
    let mut a = connect(&server).await;
    let mut b = connect(&server).await;

    send_line(&mut a, "setPlayer(steve,0,64,0)").await;
    send_line(&mut b, "setPlayer(steve,10,64,10)").await;
    read_reply(&mut a).await;
    read_reply(&mut b).await;

    // A writes a block, B reads the same absolute position through its own
    // origin offset.
    send_line(&mut a, "world.setBlock(5,0,5,GLASS)").await;
    read_reply(&mut a).await;
    send_line(&mut b, "world.getBlock(-5,0,-5)").await;
    assert_eq!(read_reply(&mut b).await, "GLASS");

    server.stop();
}
