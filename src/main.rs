//! NaoNav - menu front-end for the NAO exploration and control demos.
//!
//! Connects to a robot (NAOqi bridge daemon or the built-in simulation)
//! and dispatches numbered menu choices to the control behaviors and the
//! exploration session.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{error, info, warn};

use nao_nav::config::NavConfig;
use nao_nav::control;
use nao_nav::error::Result;
use nao_nav::exploration::ExplorationSession;
use nao_nav::services::{Robot, create_robot};
use nao_nav::walk::WalkController;

/// Dwell at each head-scan stop.
const SCAN_DWELL: Duration = Duration::from_secs(4);

/// Distance and speed for the standalone sonar-guided walk.
const MENU_WALK_DISTANCE: f32 = 0.5;
const MENU_WALK_SPEED: f32 = 0.5;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nao_nav=info".parse().unwrap()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    let mut config = if args.len() > 1 && !args[1].starts_with("--") {
        let config_path = Path::new(&args[1]);
        info!("Loading configuration from {:?}", config_path);
        NavConfig::load(config_path)?
    } else if Path::new("nao-nav.toml").exists() {
        info!("Loading configuration from nao-nav.toml");
        NavConfig::load(Path::new("nao-nav.toml"))?
    } else {
        info!("Using default configuration");
        NavConfig::default()
    };

    // Flag overrides
    if let Some(ip) = flag_value(&args, "--robot") {
        info!("Using robot IP: {}", ip);
        config.connection.mode = "bridge".to_string();
        config.connection.robot_ip = ip;
    }
    if args.iter().any(|a| a == "--sim") {
        config.connection.mode = "sim".to_string();
    }

    info!("NaoNav v{}", env!("CARGO_PKG_VERSION"));
    info!("Robot mode: {}", config.connection.mode);

    let robot = Arc::new(Mutex::new(create_robot(&config)?));
    let mut session = ExplorationSession::new(config.clone(), Arc::clone(&robot));

    menu_loop(&config, &robot, &mut session)?;

    // Leave the robot resting and no worker running
    session.stop();
    if let Ok(mut robot) = robot.lock()
        && let Err(e) = robot.motion.rest()
    {
        warn!("Failed to rest robot: {}", e);
    }

    info!("NaoNav finished");
    Ok(())
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn print_menu() {
    println!();
    println!("==== NaoNav ====");
    println!(" 1. Stand up");
    println!(" 2. Sit down");
    println!(" 3. Person scan (3 stops)");
    println!(" 4. Horizontal head scan");
    println!(" 5. Vertical head scan");
    println!(" 6. Reset head to horizon");
    println!(" 7. Balance readout");
    println!(" 8. Sonar check");
    println!(" 9. Sonar-guided walk");
    println!("10. Start exploration");
    println!("11. Stop exploration");
    println!(" 0. Quit");
    print!("> ");
    let _ = std::io::stdout().flush();
}

fn menu_loop(
    config: &NavConfig,
    robot: &Arc<Mutex<Robot>>,
    session: &mut ExplorationSession,
) -> Result<()> {
    let stdin = std::io::stdin();

    loop {
        print_menu();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        let choice = line.trim();
        if choice.is_empty() {
            continue;
        }

        // Exploration control does not need the robot lock
        match choice {
            "10" => {
                session.start();
                continue;
            }
            "11" => {
                session.stop();
                continue;
            }
            "0" => break,
            _ => {}
        }

        if session.is_active() {
            println!("Exploration is running; stop it first (11)");
            continue;
        }

        let mut robot = match robot.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Robot services poisoned: {}", e);
                break;
            }
        };

        let result = dispatch(choice, config, &mut robot);
        if let Err(e) = result {
            error!("Command failed: {}", e);
        }
    }

    Ok(())
}

fn dispatch(choice: &str, config: &NavConfig, robot: &mut Robot) -> Result<()> {
    match choice {
        "1" => {
            control::stand_up(robot)?;
        }
        "2" => {
            control::sit_down(robot)?;
        }
        "3" => control::scan_person_vertical(robot, SCAN_DWELL)?,
        "4" => control::scan_head_horizontal(robot, 5, SCAN_DWELL)?,
        "5" => control::scan_head_vertical(robot, 5, SCAN_DWELL)?,
        "6" => control::reset_head(robot)?,
        "7" => {
            let report = control::read_balance(robot);
            let source = if report.derived_angles {
                "accelerometer"
            } else {
                "robot"
            };
            println!(
                "Balance ({}): roll {:.2}°, pitch {:.2}°",
                source,
                report.roll.to_degrees(),
                report.pitch.to_degrees()
            );
            println!(
                "Gyro: ({:.4}, {:.4}, {:.4}) rad/s  Accel: ({:.2}, {:.2}, {:.2}) m/s²",
                report.gyro[0],
                report.gyro[1],
                report.gyro[2],
                report.accel[0],
                report.accel[1],
                report.accel[2]
            );
            if let Some(battery) = report.battery {
                println!("Battery: {:.0}%", battery * 100.0);
            }
        }
        "8" => {
            let (reading, crossed) = control::sonar_check(robot, config.walk.safe_distance)?;
            println!(
                "Sonar: L {:.2}m, R {:.2}m{}",
                reading.left,
                reading.right,
                if crossed { "  (boundary crossed)" } else { "" }
            );
        }
        "9" => {
            robot.motion.wake_up()?;
            let mut walk = WalkController::new(config.walk.clone());
            let success = walk.move_forward(
                robot.motion.as_mut(),
                robot.sensors.as_mut(),
                MENU_WALK_DISTANCE,
                MENU_WALK_SPEED,
            );
            println!(
                "Walk {}: {:.2}m covered",
                if success { "done" } else { "stopped" },
                walk.distance_covered()
            );
        }
        other => println!("Unknown choice: {}", other),
    }
    Ok(())
}
