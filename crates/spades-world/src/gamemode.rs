//! Game mode state. The world only stores it; network handlers fill it in.

use spades_geom::Vec3;

#[derive(Clone, Debug, PartialEq)]
pub enum GameMode {
    CaptureTheFlag(CtfState),
    TerritoryControl(TcState),
}

impl GameMode {
    pub fn name(&self) -> &'static str {
        match self {
            GameMode::CaptureTheFlag(_) => "ctf",
            GameMode::TerritoryControl(_) => "tc",
        }
    }

    pub fn as_ctf(&self) -> Option<&CtfState> {
        match self {
            GameMode::CaptureTheFlag(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_ctf_mut(&mut self) -> Option<&mut CtfState> {
        match self {
            GameMode::CaptureTheFlag(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tc(&self) -> Option<&TcState> {
        match self {
            GameMode::TerritoryControl(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_tc_mut(&mut self) -> Option<&mut TcState> {
        match self {
            GameMode::TerritoryControl(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CtfTeam {
    pub score: u32,
    pub base_pos: Vec3,
    pub intel_pos: Vec3,
    /// Slot of the enemy player carrying this team's intel.
    pub intel_carrier: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CtfState {
    pub teams: [CtfTeam; 2],
    pub capture_limit: u32,
}

impl CtfState {
    pub fn team(&self, team: usize) -> Option<&CtfTeam> {
        self.teams.get(team)
    }

    pub fn is_carrying_intel(&self, player: usize) -> bool {
        self.teams.iter().any(|t| t.intel_carrier == Some(player))
    }

    pub fn winner(&self) -> Option<usize> {
        if self.capture_limit == 0 {
            return None;
        }
        self.teams.iter().position(|t| t.score >= self.capture_limit)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Territory {
    pub position: Vec3,
    /// Owning team, `None` when neutral.
    pub owner: Option<u8>,
    /// Capture progress toward `capturing_team`, 0..=1.
    pub progress: f32,
    pub capturing_team: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TcState {
    pub territories: Vec<Territory>,
}

impl TcState {
    pub fn territory(&self, index: usize) -> Option<&Territory> {
        self.territories.get(index)
    }

    pub fn owned_by(&self, team: u8) -> usize {
        self.territories.iter().filter(|t| t.owner == Some(team)).count()
    }
}
