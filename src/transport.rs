use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;
use crate::bot::Event;
use crate::error::{Error, Result};
use crate::games::mines::MinesGame;
use crate::utils::*;

/// Outbound requests to the chat platform. Replies arrive later as [`Event`]s.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Ask the game bot for a new round
    async fn start_round(&mut self, bet: u64, bombs: u8) -> Result<()>;
    /// Press the tile button at `coord` on the latest board
    async fn click_cell(&mut self, coord: Coord) -> Result<()>;
    /// Press whichever button looks like a cash-out
    async fn click_cash_out(&mut self) -> Result<()>;
    /// Message for the operators
    async fn notify(&mut self, text: &str) -> Result<()>;
}

/// Plays against a local [`MinesGame`] and answers with the bot's message texts
pub struct SimulatedTransport {
    events: UnboundedSender<Event>,
    game: Option<MinesGame>,
    grid_size: usize,
    rng: StdRng,
    /// Everything sent to the operators, newest last
    pub notices: Vec<String>,
}

impl SimulatedTransport {
    pub fn new(events: UnboundedSender<Event>, grid_size: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(1)),
            None => StdRng::from_os_rng(),
        };
        SimulatedTransport { events, game: None, grid_size, rng, notices: vec![] }
    }

    fn send(&self, event: Event) -> Result<()> {
        self.events.send(event).map_err(|_| Error::Transport("event channel closed".into()))
    }

    fn active_game(&mut self) -> Result<&mut MinesGame> {
        match self.game.as_mut() {
            Some(g) if !g.is_over() => Ok(g),
            _ => Err(Error::Transport("no round in progress".into())),
        }
    }

    /// Report the finished round: full layout first, then the bot's closing message
    fn finish(&mut self, won: bool) -> Result<()> {
        let Some(mut game) = self.game.take() else { return Ok(()) };
        self.send(Event::Layout(game.layout()))?;
        let message = if won {
            let payout = game.cash_out();
            game.won_message(payout)
        } else {
            game.lost_message()
        };
        self.send(Event::Game(message))
    }
}

impl Transport for SimulatedTransport {
    async fn start_round(&mut self, bet: u64, bombs: u8) -> Result<()> {
        let game = MinesGame::new(self.grid_size, bombs, bet, &mut self.rng);
        log::debug!("Simulated round: bombs at {:?}", game.layout().bombs);
        let started = game.started_message();
        self.game = Some(game);
        self.send(Event::Game(started))
    }

    async fn click_cell(&mut self, coord: Coord) -> Result<()> {
        let game = self.active_game()?;
        match game.reveal(coord)? {
            Outcome::Bomb => self.finish(false),
            _ if game.is_over() => self.finish(true),
            _ => {
                let message = game.found_message();
                self.send(Event::Game(message))
            }
        }
    }

    async fn click_cash_out(&mut self) -> Result<()> {
        let game = self.active_game().map_err(|_| Error::NoCashOutButton)?;
        if game.keyboard().find_cash_out().is_none() {
            return Err(Error::NoCashOutButton);
        }
        self.finish(true)
    }

    async fn notify(&mut self, text: &str) -> Result<()> {
        println!("{text}");
        self.notices.push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::RoundUpdate;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
        let mut out = vec![];
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    fn updates(events: &[Event]) -> Vec<RoundUpdate> {
        events.iter().filter_map(|e| match e {
            Event::Game(m) => Some(m.classify()),
            _ => None,
        }).collect()
    }

    #[tokio::test]
    async fn test_round_trip_through_simulator() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = SimulatedTransport::new(tx, 5, Some(3));
        transport.start_round(20, 3).await.unwrap();
        assert!(matches!(updates(&drain(&mut rx)).as_slice(), [RoundUpdate::Grid { diamond: false, .. }]));

        let safe = transport.game.as_ref().unwrap().layout().diamonds[0];
        transport.click_cell(safe).await.unwrap();
        assert!(matches!(updates(&drain(&mut rx)).as_slice(), [RoundUpdate::Grid { diamond: true, .. }]));
        assert!(transport.click_cell(safe).await.is_err(), "same tile twice");

        transport.click_cash_out().await.unwrap();
        let events = drain(&mut rx);
        assert!(matches!(events.first(), Some(Event::Layout(_))));
        assert!(matches!(updates(&events).as_slice(), [RoundUpdate::Won { .. }]));
        assert!(matches!(transport.click_cash_out().await, Err(Error::NoCashOutButton)));
    }

    #[tokio::test]
    async fn test_bomb_reports_loss() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut transport = SimulatedTransport::new(tx, 5, Some(4));
        transport.start_round(20, 3).await.unwrap();
        drain(&mut rx);
        let bomb = transport.game.as_ref().unwrap().layout().bombs[0];
        transport.click_cell(bomb).await.unwrap();
        assert_eq!(updates(&drain(&mut rx)), vec![RoundUpdate::Lost]);
        assert!(transport.click_cell(Coord::new(0, 0)).await.is_err());
    }
}
