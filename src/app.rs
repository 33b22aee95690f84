use std::fmt;

use crate::core::Countdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Entry card over the idling tunnel
    Portal,
    /// Flying; the tunnel accelerates
    Tunnel,
    /// Destination screen after travel
    Selection,
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewState::Portal => "portal",
            ViewState::Tunnel => "tunnel",
            ViewState::Selection => "selection",
        };
        f.write_str(name)
    }
}

/// Portal -> tunnel -> selection, with a travel timer in between
#[derive(Debug, Clone)]
pub struct ViewRouter {
    view: ViewState,
    travel: Countdown,
}

impl ViewRouter {
    pub fn new(travel_seconds: f32) -> Self {
        Self {
            view: ViewState::Portal,
            travel: Countdown::new(travel_seconds),
        }
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// The tunnel flies only while its view is showing
    pub fn is_flying(&self) -> bool {
        self.view == ViewState::Tunnel
    }

    /// Leave the portal. Returns false when not on the portal.
    pub fn enter(&mut self) -> bool {
        if self.view != ViewState::Portal {
            return false;
        }
        self.view = ViewState::Tunnel;
        self.travel.start();
        log::info!("Entering the tunnel");
        true
    }

    /// Straight back to the portal from the selection screen
    pub fn back(&mut self) -> bool {
        if self.view != ViewState::Selection {
            return false;
        }
        self.view = ViewState::Portal;
        log::info!("Back to the portal");
        true
    }

    /// Advance the travel timer; an early flight completion also ends travel
    pub fn update(&mut self, delta: f32, flight_completed: bool) {
        if self.view != ViewState::Tunnel {
            return;
        }
        if self.travel.tick(delta) || flight_completed {
            self.travel.cancel();
            self.view = ViewState::Selection;
            log::info!("Arrived at selection");
        }
    }
}
