//! Match result and ranking system
//!
//! Computes final match results and agent rankings.

use serde::{Deserialize, Serialize};

use crate::game::state::{AgentId, Archetype, Character};

/// Reason why a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchEndReason {
    /// The primary agent went down
    PrimaryEliminated,
    /// Every bot went down
    AllBotsEliminated,
    /// Time limit reached
    TimeLimit,
}

/// Agent ranking in match results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRanking {
    pub id: AgentId,
    pub archetype: Archetype,
    pub is_primary: bool,
    pub rank: u32,
    pub kills: u32,
    pub damage_dealt: f32,
    pub survived: bool,
    pub final_hp: f32,
    pub eliminated_at: Option<f32>,
}

/// Final report for one match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub seed: u64,
    pub end_reason: MatchEndReason,
    pub duration: f32,
    pub ticks: u64,
    pub winner: Option<AgentId>,
    pub total_kills: u32,
    pub rankings: Vec<AgentRanking>,
}

impl MatchSummary {
    pub fn primary_won(&self) -> bool {
        self.end_reason == MatchEndReason::AllBotsEliminated
    }

    pub fn ranking_of(&self, id: AgentId) -> Option<&AgentRanking> {
        self.rankings.iter().find(|r| r.id == id)
    }
}

/// Rank every agent: survivors first, then kills, then damage dealt
pub fn determine_result(
    characters: &[Character],
    seed: u64,
    end_reason: MatchEndReason,
    duration: f32,
    ticks: u64,
) -> MatchSummary {
    let mut rankings: Vec<AgentRanking> = characters
        .iter()
        .map(|c| AgentRanking {
            id: c.id,
            archetype: c.archetype,
            is_primary: c.is_primary,
            rank: 0,
            kills: c.kills,
            damage_dealt: c.damage_dealt,
            survived: c.alive,
            final_hp: c.hp,
            eliminated_at: c.eliminated_at,
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.survived
            .cmp(&a.survived)
            .then_with(|| b.kills.cmp(&a.kills))
            .then_with(|| b.damage_dealt.total_cmp(&a.damage_dealt))
    });

    for (i, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = (i + 1) as u32;
    }

    let total_kills = rankings.iter().map(|r| r.kills).sum();
    let winner = rankings.first().filter(|r| r.survived).map(|r| r.id);

    MatchSummary {
        seed,
        end_reason,
        duration,
        ticks,
        winner,
        total_kills,
        rankings,
    }
}

/// Check if the match should end. The primary agent going down is checked
/// first, so a mutual last hit counts as a loss.
pub fn check_match_end(characters: &[Character], clock: f32, max_seconds: f32) -> Option<MatchEndReason> {
    if characters.iter().any(|c| c.is_primary && !c.alive) {
        return Some(MatchEndReason::PrimaryEliminated);
    }

    if !characters.iter().any(|c| !c.is_primary && c.alive) {
        return Some(MatchEndReason::AllBotsEliminated);
    }

    if clock >= max_seconds {
        return Some(MatchEndReason::TimeLimit);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::vec2::Vec2;

    fn create_agent(id: AgentId, alive: bool, kills: u32, damage: f32) -> Character {
        let mut c = Character::new(id, Archetype::Tank, Vec2::ZERO, id == 0);
        c.alive = alive;
        c.kills = kills;
        c.damage_dealt = damage;
        if !alive {
            c.hp = 0.0;
        }
        c
    }

    #[test]
    fn test_determine_result_single_winner() {
        let agents = vec![
            create_agent(0, true, 3, 500.0),
            create_agent(1, false, 0, 80.0),
            create_agent(2, false, 0, 40.0),
        ];

        let result = determine_result(&agents, 7, MatchEndReason::AllBotsEliminated, 42.0, 2520);

        assert_eq!(result.winner, Some(0));
        assert!(result.primary_won());
        assert_eq!(result.rankings[0].id, 0);
        assert_eq!(result.rankings[0].rank, 1);
        assert_eq!(result.seed, 7);
    }

    #[test]
    fn test_determine_result_no_survivors() {
        let agents = vec![create_agent(0, false, 1, 0.0), create_agent(1, false, 2, 0.0)];

        let result = determine_result(&agents, 0, MatchEndReason::PrimaryEliminated, 10.0, 600);

        assert!(result.winner.is_none());
        // Still ranked by kills
        assert_eq!(result.rankings[0].id, 1);
    }

    #[test]
    fn test_ranking_order() {
        let agents = vec![
            create_agent(0, true, 2, 100.0),
            create_agent(1, true, 2, 300.0),
            create_agent(2, false, 5, 900.0),
            create_agent(3, true, 4, 0.0),
        ];

        let result = determine_result(&agents, 0, MatchEndReason::TimeLimit, 180.0, 10_800);
        let order: Vec<AgentId> = result.rankings.iter().map(|r| r.id).collect();

        // survivors, then kills, then damage
        assert_eq!(order, vec![3, 1, 0, 2]);
        assert_eq!(result.total_kills, 13);
        assert_eq!(result.ranking_of(2).map(|r| r.rank), Some(4));
    }

    #[test]
    fn test_check_match_end_primary_down() {
        let agents = vec![create_agent(0, false, 0, 0.0), create_agent(1, true, 0, 0.0)];
        assert_eq!(
            check_match_end(&agents, 5.0, 180.0),
            Some(MatchEndReason::PrimaryEliminated)
        );
    }

    #[test]
    fn test_check_match_end_bots_down() {
        let agents = vec![
            create_agent(0, true, 0, 0.0),
            create_agent(1, false, 0, 0.0),
            create_agent(2, false, 0, 0.0),
        ];
        assert_eq!(
            check_match_end(&agents, 5.0, 180.0),
            Some(MatchEndReason::AllBotsEliminated)
        );
    }

    #[test]
    fn test_mutual_elimination_is_a_loss() {
        let agents = vec![create_agent(0, false, 1, 0.0), create_agent(1, false, 1, 0.0)];
        assert_eq!(
            check_match_end(&agents, 5.0, 180.0),
            Some(MatchEndReason::PrimaryEliminated)
        );
    }

    #[test]
    fn test_check_match_end_time_limit() {
        let agents = vec![create_agent(0, true, 0, 0.0), create_agent(1, true, 0, 0.0)];
        assert_eq!(check_match_end(&agents, 180.0, 180.0), Some(MatchEndReason::TimeLimit));
        assert!(check_match_end(&agents, 60.0, 180.0).is_none());
    }

    #[test]
    fn test_summary_serializes() {
        let agents = vec![create_agent(0, true, 1, 10.0), create_agent(1, false, 0, 0.0)];
        let result = determine_result(&agents, 3, MatchEndReason::AllBotsEliminated, 1.5, 90);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["end_reason"], "all_bots_eliminated");
        assert_eq!(json["rankings"][0]["archetype"], "tank");
        assert_eq!(json["winner"], 0);
    }
}
