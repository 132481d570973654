/// A navigation command received on [`vessel_ais::topics::SCREEN_COMMAND`]
/// (spec §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    Next,
    Previous,
}

/// The bus payload published on `screen.command`.
#[derive(Debug, Clone, Copy)]
pub struct ScreenCommand {
    pub action: ScreenAction,
}
