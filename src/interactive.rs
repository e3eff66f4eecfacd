//! Menu-driven session
//!
//! Prompts stay out of the ladder core: this module asks the operator for a
//! pool, an action and the participants, then drives [`LadderManager`] one
//! call per recorded result.

use crate::cli::{build_ladder, describe_settlement};
use crate::config::AppConfig;
use crate::ladder::LadderManager;
use crate::types::{MatchType, Outcome, PlayerId};
use crate::utils::normalize_input;
use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use tracing::{debug, warn};

/// Top-level menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddPlayer,
    AddGameResult,
    ShowRanking,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::AddPlayer, Action::AddGameResult, Action::ShowRanking];

    pub fn label(self) -> &'static str {
        match self {
            Action::AddPlayer => "Add a new player",
            Action::AddGameResult => "Add a new game result",
            Action::ShowRanking => "Show the current ranking",
        }
    }
}

/// Prompt for `slot` of `team` (both 0-based)
pub fn player_prompt(slot: usize, team: usize) -> String {
    format!(
        "Shortened name of player {} of team {} (ex. boverwoe)",
        slot + 1,
        team + 1
    )
}

/// Read an outcome as typed by the operator; anything but 0 or 1 is `None`
pub fn parse_outcome(raw: &str) -> Option<Outcome> {
    raw.trim().parse::<i64>().ok().and_then(|score| Outcome::try_from(score).ok())
}

/// Run one interactive session
pub fn run(config: &AppConfig, preset: Option<MatchType>) -> Result<()> {
    let match_type = match preset {
        Some(match_type) => match_type,
        None => choose_match_type()?,
    };
    let ladder = build_ladder(config, match_type)?;

    let labels: Vec<&str> = Action::ALL.iter().map(|a| a.label()).collect();
    let selection = Select::new()
        .with_prompt("Please choose one of the following options")
        .items(labels.as_slice())
        .default(0)
        .interact()?;
    debug!("Menu selection: {:?}", Action::ALL[selection]);

    match Action::ALL[selection] {
        Action::AddPlayer => add_player(&ladder),
        Action::AddGameResult => add_game_results(&ladder),
        Action::ShowRanking => {
            println!("\n{}", ladder.leaderboard()?);
            Ok(())
        }
    }
}

fn choose_match_type() -> Result<MatchType> {
    let options = [MatchType::Singles, MatchType::Doubles];
    let selection = Select::new()
        .with_prompt("Welcome! Are you interested in singles or doubles?")
        .items(&["Singles", "Doubles"][..])
        .default(0)
        .interact()?;
    Ok(options[selection])
}

fn add_player(ladder: &LadderManager) -> Result<()> {
    let name: String = Input::new()
        .with_prompt("Shortened name of the player to add (ex. boverwoe)")
        .interact_text()?;
    let record = ladder.register_player(&normalize_input(&name))?;
    println!(
        "Player {} successfully added to the database with a rating of {}",
        record.player_id, record.rating
    );
    Ok(())
}

fn prompt_lineup(ladder: &LadderManager) -> Result<Vec<PlayerId>> {
    let team_size = ladder.match_type().team_size();
    let mut participants = Vec::with_capacity(ladder.match_type().participant_count());

    for team in 0..2 {
        for slot in 0..team_size {
            let name: String = Input::new()
                .with_prompt(player_prompt(slot, team))
                .validate_with(|input: &String| -> std::result::Result<(), String> {
                    let name = normalize_input(input);
                    match ladder.is_registered(&name) {
                        Ok(true) => Ok(()),
                        Ok(false) => Err(format!("The player {} does not exist!", name)),
                        Err(e) => Err(format!("Could not read the player file: {:#}", e)),
                    }
                })
                .interact_text()?;
            participants.push(normalize_input(&name));
        }
    }

    Ok(participants)
}

/// Ask the lineup once, then record results for it until the operator stops
fn add_game_results(ladder: &LadderManager) -> Result<()> {
    let participants = prompt_lineup(ladder)?;
    let rated = ladder.prepare(&participants)?;
    let mut pending = Some(rated);

    loop {
        let raw: String = Input::new()
            .with_prompt("What was the score of the game? (1 if team 1 won, 0 if team 1 lost)")
            .interact_text()?;
        let Some(outcome) = parse_outcome(&raw) else {
            println!("Please either give a score of 1 or 0.");
            warn!("Stopping after invalid outcome '{}'", raw.trim());
            return Ok(());
        };

        // Ratings are re-read for every result after the first
        let rated = match pending.take() {
            Some(rated) => rated,
            None => ladder.prepare(&participants)?,
        };

        let settled = ladder.settle(rated, outcome)?;
        println!("{}", describe_settlement(&settled));
        println!("New player ratings have been successfully processed!");

        let again = Confirm::new()
            .with_prompt("Add another result for the same players?")
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outcome() {
        assert_eq!(parse_outcome("1"), Some(Outcome::TeamOneWon));
        assert_eq!(parse_outcome(" 0\n"), Some(Outcome::TeamOneLost));
        assert_eq!(parse_outcome("2"), None);
        assert_eq!(parse_outcome("-1"), None);
        assert_eq!(parse_outcome("won"), None);
        assert_eq!(parse_outcome(""), None);
    }

    #[test]
    fn test_player_prompt() {
        assert_eq!(
            player_prompt(1, 0),
            "Shortened name of player 2 of team 1 (ex. boverwoe)"
        );
    }

    #[test]
    fn test_menu_labels() {
        let labels: Vec<_> = Action::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Add a new player",
                "Add a new game result",
                "Show the current ranking"
            ]
        );
    }
}
