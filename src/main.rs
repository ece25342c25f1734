/*
 *  main.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host loop: minute ticks, companion messages, shutdown
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, Timelike};
use env_logger::Env;
use log::{debug, error, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use wxface::config::{self, Config};
use wxface::{FaceLayout, FrameSurface, Payload, WatchFace};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

type MessageLines = Lines<BufReader<Box<dyn AsyncRead + Unpin + Send>>>;

enum Event {
    Tick,
    Line(std::io::Result<Option<String>>),
    Shutdown,
}

/// Waits for a SIGINT, SIGTERM, or SIGHUP signal.
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal_handler().await {
        warn!("signal handlers unavailable ({}), waiting on ctrl-c", e);
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn open_messages(path: &Path) -> anyhow::Result<MessageLines> {
    let reader: Box<dyn AsyncRead + Unpin + Send> = if path == Path::new("-") {
        Box::new(tokio::io::stdin())
    } else {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("opening message source {}", path.display()))?;
        Box::new(file)
    };
    Ok(BufReader::new(reader).lines())
}

/// Next payload line, or never once the source is exhausted
async fn next_line(lines: &mut Option<MessageLines>) -> std::io::Result<Option<String>> {
    match lines {
        Some(lines) => lines.next_line().await,
        None => std::future::pending().await,
    }
}

/// Delay until the next tick boundary on the wall clock
fn first_tick_delay(period: Duration) -> Duration {
    let period_secs = period.as_secs().max(1);
    let into = u64::from(Local::now().second()) % period_secs;
    Duration::from_secs(period_secs - into)
}

fn render(face: &WatchFace<FrameSurface>, cfg: &Config) {
    if cfg.render() {
        println!("{}", face.surface().to_ascii());
    }
}

fn tick(face: &mut WatchFace<FrameSurface>, cfg: &Config) {
    if let Err(e) = face.on_tick(&Local::now().naive_local(), cfg.clock_style()) {
        error!("clock update failed: {}", e);
    }
    render(face, cfg);
}

fn handle_line(face: &mut WatchFace<FrameSurface>, cfg: &Config, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match Payload::from_json(line) {
        Ok(payload) if payload.is_empty() => debug!("payload with no known keys skipped"),
        Ok(payload) => {
            let outcome = face.on_message(&payload);
            debug!("message outcome {:?}", outcome);
            render(face, cfg);
        }
        Err(e) => warn!("dropping message: {}", e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    env_logger::Builder::from_env(Env::default().default_filter_or(cfg.log_level()))
        .format_timestamp_secs()
        .init();

    info!("{} weather on the wrist", env!("CARGO_PKG_NAME"));
    info!("v.{} ({}) built {}", env!("CARGO_PKG_VERSION"), BUILD_PROFILE, BUILD_DATE);

    let (width, height) = cfg.display_size();
    let layout = FaceLayout::for_display(width, height);
    let surface = FrameSurface::new(layout.clone(), cfg.max_bitmaps());
    let mut face = WatchFace::new(surface, &layout);
    info!("display {}x{}, {} bitmap(s), {:?} clock", width, height, cfg.max_bitmaps(), cfg.clock_style());

    face.on_start().context("starting face")?;
    tick(&mut face, &cfg);

    let mut lines = match cfg.messages.as_deref() {
        Some(path) => Some(open_messages(path).await?),
        None => None,
    };

    let period = cfg.tick_period();
    let mut ticker = interval_at(Instant::now() + first_tick_delay(period), period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("entering main loop");
    loop {
        let event = tokio::select! {
            _ = ticker.tick() => Event::Tick,
            line = next_line(&mut lines) => Event::Line(line),
            _ = tokio::signal::ctrl_c() => {
                info!("ctrl-c received. Initiating graceful shutdown.");
                Event::Shutdown
            }
            _ = &mut shutdown => Event::Shutdown,
        };

        match event {
            Event::Tick => tick(&mut face, &cfg),
            Event::Line(Ok(Some(line))) => handle_line(&mut face, &cfg, &line),
            Event::Line(Ok(None)) => {
                info!("message source exhausted, clock keeps running");
                lines = None;
            }
            Event::Line(Err(e)) => {
                error!("message source failed: {}", e);
                lines = None;
            }
            Event::Shutdown => break,
        }
    }

    face.on_stop();
    render(&face, &cfg);
    info!("bye");
    Ok(())
}
