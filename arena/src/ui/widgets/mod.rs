//! TUI widgets for the arena

pub mod character_form;
pub mod combat_log;
pub mod fighter_panel;
pub mod level_list;
pub mod roster;
pub mod stat_radar;

pub use character_form::CharacterFormWidget;
pub use combat_log::CombatLogWidget;
pub use fighter_panel::FighterPanelWidget;
pub use level_list::LevelListWidget;
pub use roster::RosterWidget;
pub use stat_radar::StatRadarWidget;
