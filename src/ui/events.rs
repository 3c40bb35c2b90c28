use crate::composer::RhymeResponse;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Debug, Clone)]
pub enum AppEvent {
    // Terminal input
    Key(KeyEvent),
    Resize,

    // Periodic housekeeping (autosave, status expiry)
    Tick,

    // A rhyme request finished
    RhymesArrived(RhymeResponse),
}

pub struct EventHandler {
    event_sender: mpsc::UnboundedSender<AppEvent>,
    event_receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();

        Self {
            event_sender,
            event_receiver,
        }
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.event_sender.clone()
    }

    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.event_receiver.recv().await
    }

    /// Forward crossterm input on a blocking thread until the receiver goes away.
    pub fn spawn_terminal_reader(&self) -> JoinHandle<()> {
        let sender = self.sender();
        tokio::task::spawn_blocking(move || {
            while !sender.is_closed() {
                match event::poll(Duration::from_millis(50)) {
                    Ok(false) => continue,
                    Ok(true) => {}
                    Err(e) => {
                        warn!("Terminal poll failed: {}", e);
                        break;
                    }
                }

                let app_event = match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                    Ok(Event::Resize(_, _)) => AppEvent::Resize,
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Terminal read failed: {}", e);
                        break;
                    }
                };

                if sender.send(app_event).is_err() {
                    break;
                }
            }
        })
    }

    /// Send `AppEvent::Tick` every `period`.
    pub fn spawn_ticker(&self, period: Duration) -> JoinHandle<()> {
        let sender = self.sender();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if sender.send(AppEvent::Tick).is_err() {
                    break;
                }
            }
        })
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
