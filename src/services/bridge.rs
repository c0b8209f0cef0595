//! NAOqi bridge TCP client.
//!
//! The robot side runs a small bridge daemon exposing ALMotion,
//! ALRobotPosture, ALSonar and ALMemory over one TCP socket. Each call is
//! a length-prefixed JSON frame answered by exactly one reply frame:
//!
//! ```text
//! -> { "service": "ALMotion", "method": "moveToward", "args": [0.3, 0.0, 0.0] }
//! <- { "result": null }
//! <- { "error": "..." }          on failure
//! ```
//!
//! The three service handles share one connection and serialize their
//! calls over it.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::NavConfig;
use crate::core::Pose2D;
use crate::error::{NavError, Result};

use super::{MotionService, PostureService, Robot, SensorKey, SensorService};

#[derive(Serialize)]
struct Request<'a> {
    service: &'a str,
    method: &'a str,
    args: Vec<Value>,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// TCP connection to the bridge daemon.
pub struct BridgeClient {
    stream: TcpStream,
}

impl BridgeClient {
    /// Connect with a timeout.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<Self> {
        let addr: std::net::SocketAddr = addr
            .parse()
            .map_err(|e| NavError::Config(format!("Invalid address: {}", e)))?;
        let stream = TcpStream::connect_timeout(&addr, timeout)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream })
    }

    /// Set the read timeout for replies.
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.stream.set_read_timeout(timeout)?;
        Ok(())
    }

    /// Perform one call and return its result value.
    pub fn call(&mut self, service: &str, method: &str, args: Vec<Value>) -> Result<Value> {
        let encoded = serde_json::to_vec(&Request {
            service,
            method,
            args,
        })?;

        // Write length prefix (big-endian), then the frame
        let len = encoded.len() as u32;
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(&encoded)?;
        self.stream.flush()?;

        // Read the reply frame
        let mut len_buf = [0u8; 4];
        self.stream.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut buf = vec![0u8; len];
        self.stream.read_exact(&mut buf)?;

        let response: Response = serde_json::from_slice(&buf)?;
        if let Some(error) = response.error {
            return Err(NavError::Service(error));
        }
        Ok(response.result)
    }
}

/// Shared connection handle.
pub type SharedBridge = Arc<Mutex<BridgeClient>>;

fn call(bridge: &SharedBridge, service: &str, method: &str, args: Vec<Value>) -> Result<Value> {
    let mut client = bridge
        .lock()
        .map_err(|_| NavError::Service("Bridge connection poisoned".to_string()))?;
    client.call(service, method, args)
}

/// Connect to the bridge daemon and build the remote service set.
pub fn create_bridge_robot(config: &NavConfig) -> Result<Robot> {
    let addr = config.address();
    tracing::info!("Connecting to NAOqi bridge at {}...", addr);

    let timeout = Duration::from_millis(config.connection.timeout_ms);
    let mut client = BridgeClient::connect_timeout(&addr, timeout)?;
    client.set_timeout(Some(timeout))?;

    tracing::info!("Connected to NAOqi bridge");

    let bridge: SharedBridge = Arc::new(Mutex::new(client));
    Ok(Robot {
        motion: Box::new(BridgeMotion(Arc::clone(&bridge))),
        posture: Box::new(BridgePosture(Arc::clone(&bridge))),
        sensors: Box::new(BridgeSensors(bridge)),
    })
}

pub struct BridgeMotion(pub SharedBridge);

impl MotionService for BridgeMotion {
    fn wake_up(&mut self) -> Result<()> {
        call(&self.0, "ALMotion", "wakeUp", vec![])?;
        Ok(())
    }

    fn rest(&mut self) -> Result<()> {
        call(&self.0, "ALMotion", "rest", vec![])?;
        Ok(())
    }

    fn move_toward(&mut self, vx: f32, vy: f32, omega: f32) -> Result<()> {
        call(
            &self.0,
            "ALMotion",
            "moveToward",
            vec![json!(vx), json!(vy), json!(omega)],
        )?;
        Ok(())
    }

    fn stop_move(&mut self) -> Result<()> {
        call(&self.0, "ALMotion", "stopMove", vec![])?;
        Ok(())
    }

    fn get_position(&mut self) -> Result<Pose2D> {
        // true = use sensor values rather than the command reference
        let value = call(&self.0, "ALMotion", "getRobotPosition", vec![json!(true)])?;
        let coords: Vec<f32> = serde_json::from_value(value)
            .map_err(|e| NavError::Protocol(format!("Bad position reply: {}", e)))?;
        if coords.len() != 3 {
            return Err(NavError::Protocol(format!(
                "Position reply has {} fields, expected 3",
                coords.len()
            )));
        }
        Ok(Pose2D::new(coords[0], coords[1], coords[2]))
    }

    fn set_angles(&mut self, names: &[&str], angles: &[f32], speed: f32) -> Result<()> {
        call(
            &self.0,
            "ALMotion",
            "setAngles",
            vec![json!(names), json!(angles), json!(speed)],
        )?;
        Ok(())
    }
}

pub struct BridgePosture(pub SharedBridge);

impl PostureService for BridgePosture {
    fn go_to_posture(&mut self, posture: &str, speed: f32) -> Result<bool> {
        let value = call(
            &self.0,
            "ALRobotPosture",
            "goToPosture",
            vec![json!(posture), json!(speed)],
        )?;
        Ok(value.as_bool().unwrap_or(false))
    }

    fn get_posture(&mut self) -> Result<String> {
        let value = call(&self.0, "ALRobotPosture", "getPosture", vec![])?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| NavError::Protocol("Posture reply is not a string".to_string()))
    }
}

pub struct BridgeSensors(pub SharedBridge);

impl SensorService for BridgeSensors {
    fn subscribe_sonar(&mut self, tag: &str) -> Result<()> {
        call(&self.0, "ALSonar", "subscribe", vec![json!(tag)])?;
        Ok(())
    }

    fn unsubscribe_sonar(&mut self, tag: &str) -> Result<()> {
        call(&self.0, "ALSonar", "unsubscribe", vec![json!(tag)])?;
        Ok(())
    }

    fn read(&mut self, key: SensorKey) -> Result<f32> {
        let value = call(&self.0, "ALMemory", "getData", vec![json!(key.memory_key())])?;
        value
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| NavError::Protocol(format!("{:?} reply is not a number", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    /// One-shot bridge stub: answers every frame with a canned reply.
    fn spawn_stub(reply: &'static str) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            loop {
                let mut len_buf = [0u8; 4];
                if stream.read_exact(&mut len_buf).is_err() {
                    break;
                }
                let len = u32::from_be_bytes(len_buf) as usize;
                let mut buf = vec![0u8; len];
                if stream.read_exact(&mut buf).is_err() {
                    break;
                }
                let bytes = reply.as_bytes();
                let reply_len = (bytes.len() as u32).to_be_bytes();
                if stream.write_all(&reply_len).is_err() || stream.write_all(bytes).is_err() {
                    break;
                }
            }
        });
        addr
    }

    #[test]
    fn test_call_round_trip() {
        let addr = spawn_stub(r#"{"result": [1.0, 2.0, 0.5]}"#);
        let client =
            BridgeClient::connect_timeout(&addr.to_string(), Duration::from_secs(1)).unwrap();

        let mut motion = BridgeMotion(Arc::new(Mutex::new(client)));
        let pose = motion.get_position().unwrap();
        assert_eq!(pose, Pose2D::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_error_reply_surfaces_as_service_error() {
        let addr = spawn_stub(r#"{"error": "ALMotion is busy"}"#);
        let client =
            BridgeClient::connect_timeout(&addr.to_string(), Duration::from_secs(1)).unwrap();

        let mut motion = BridgeMotion(Arc::new(Mutex::new(client)));
        match motion.stop_move() {
            Err(NavError::Service(msg)) => assert!(msg.contains("busy")),
            other => panic!("expected service error, got {:?}", other),
        }
    }
}
