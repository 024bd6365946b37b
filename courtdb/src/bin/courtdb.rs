//! League data console.
//!
//! Every mutating command authenticates against the `users` table and is
//! gated on the caller's role. Credentials come from `--user`/`--password`
//! or the `COURTDB_USER`/`COURTDB_PASSWORD` environment variables.

use std::io::Write;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use courtdb::models::{Coach, Match, Player, Team};
use courtdb::repo::{self, player::HardDeletePolicy, player::PageFilter};
use courtdb::service::auth::{self, Permission, Role};
use courtdb::service::validate::{
    NewStatisticInput, ValidationOptions, validate_new_statistic, validate_statistic_batch,
};
use courtdb::service::{ops, reports, stats};
use shared_utils::config::ConsoleConfig;
use shared_utils::env::get_env_var_opt;

#[derive(Parser)]
#[command(version, about = "League data console")]
struct Cli {
    /// Login name; falls back to COURTDB_USER.
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password; falls back to COURTDB_PASSWORD.
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending schema migrations.
    Migrate,
    /// Team commands.
    Team(TeamCmd),
    /// Player commands.
    Player(PlayerCmd),
    /// Coach commands.
    Coach(CoachCmd),
    /// Match commands.
    Match(MatchCmd),
    /// Statistic commands.
    Stat(StatCmd),
    /// Move a player to another team.
    Trade {
        #[arg(long)]
        player: i32,
        #[arg(long)]
        team: i32,
    },
    /// Arena commands.
    Arena(ArenaCmd),
    /// User account commands.
    User(UserCmd),
    /// Per-team standings report.
    Standings,
}

#[derive(Args)]
struct TeamCmd {
    #[command(subcommand)]
    sub: TeamSub,
}

#[derive(Subcommand)]
enum TeamSub {
    /// Non-deleted teams with their rosters.
    List,
    /// Soft-deleted teams.
    Deleted,
    /// One team by id.
    Show { id: i32 },
    /// Insert a team.
    Add(TeamFields),
    /// Replace every field of a team.
    Update(TeamFields),
    /// Soft-delete a team and its roster.
    Delete { id: i32 },
    /// Restore a soft-deleted team and its roster.
    Restore { id: i32 },
}

#[derive(Args)]
struct TeamFields {
    #[arg(long)]
    id: i32,
    #[arg(long)]
    arena: i32,
    #[arg(long)]
    division: i32,
    #[arg(long)]
    conference: i32,
    #[arg(long)]
    name: String,
    #[arg(long)]
    abbreviation: String,
    /// Founding date, YYYY-MM-DD.
    #[arg(long)]
    founded: Option<String>,
    #[arg(long)]
    general_manager: Option<String>,
}

impl TeamFields {
    fn into_team(self) -> Result<Team> {
        let year_founded = self.founded.as_deref().map(parse_date).transpose()?;
        Ok(Team {
            team_id: self.id,
            arena_id: self.arena,
            division_id: self.division,
            conference_id: self.conference,
            team_name: self.name,
            abbreviation: self.abbreviation,
            year_founded,
            general_manager: self.general_manager,
            deleted: false,
        })
    }
}

#[derive(Args)]
struct PlayerCmd {
    #[command(subcommand)]
    sub: PlayerSub,
}

#[derive(Subcommand)]
enum PlayerSub {
    /// Non-deleted players.
    List,
    /// Soft-deleted players.
    Deleted,
    /// One player by id.
    Show { id: i32 },
    /// Insert a player.
    Add(PlayerFields),
    /// Replace every field of a player.
    Update(PlayerFields),
    /// Soft-delete a player and the player's stat lines.
    Delete { id: i32 },
    /// Restore a soft-deleted player and stat lines.
    Restore { id: i32 },
    /// Physically remove a player. Irreversible.
    HardDelete {
        id: i32,
        /// Refuse while any statistic still references the player.
        #[arg(long)]
        require_clean: bool,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Search across names, position, country, and team name.
    Search { term: String },
    /// Top scorers by total points.
    Top {
        #[arg(default_value_t = 10)]
        n: usize,
    },
    /// One page of players, surname order.
    Page {
        #[arg(default_value_t = 1)]
        page: i64,
        #[arg(long)]
        team: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
}

#[derive(Args)]
struct PlayerFields {
    #[arg(long)]
    id: i32,
    #[arg(long)]
    team: i32,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    position: String,
    #[arg(long)]
    jersey: i32,
    /// Date of birth, YYYY-MM-DD.
    #[arg(long)]
    born: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    height_cm: f64,
    #[arg(long)]
    weight_kg: f64,
    #[arg(long)]
    draft_year: i32,
    #[arg(long)]
    draft_round: i32,
    #[arg(long)]
    draft_pick: i32,
}

impl PlayerFields {
    fn into_player(self) -> Result<Player> {
        Ok(Player {
            player_id: self.id,
            team_id: self.team,
            first_name: self.first_name,
            last_name: self.last_name,
            position: self.position,
            jersey_number: self.jersey,
            birth_date: parse_date(&self.born)?,
            country: self.country,
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            draft_year: self.draft_year,
            draft_round: self.draft_round,
            draft_pick: self.draft_pick,
            deleted: false,
        })
    }
}

#[derive(Args)]
struct CoachCmd {
    #[command(subcommand)]
    sub: CoachSub,
}

#[derive(Subcommand)]
enum CoachSub {
    /// Non-deleted coaches.
    List,
    /// Soft-deleted coaches.
    Deleted,
    /// One coach by id.
    Show { id: i32 },
    /// Insert a coach.
    Add(CoachFields),
    /// Replace every field of a coach.
    Update(CoachFields),
    /// Soft-delete a coach.
    Delete { id: i32 },
    /// Restore a soft-deleted coach.
    Restore { id: i32 },
}

#[derive(Args)]
struct CoachFields {
    #[arg(long)]
    id: i32,
    #[arg(long)]
    team: i32,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    role: String,
    /// Tenure start, YYYY-MM-DD.
    #[arg(long)]
    start: String,
    /// Tenure end, YYYY-MM-DD; omit for a sitting coach.
    #[arg(long)]
    end: Option<String>,
}

impl CoachFields {
    fn into_coach(self) -> Result<Coach> {
        let end_date = self.end.as_deref().map(parse_date).transpose()?;
        Ok(Coach {
            coach_id: self.id,
            team_id: self.team,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            start_date: parse_date(&self.start)?,
            end_date,
            deleted: false,
        })
    }
}

#[derive(Args)]
struct MatchCmd {
    #[command(subcommand)]
    sub: MatchSub,
}

#[derive(Subcommand)]
enum MatchSub {
    /// Non-deleted matches, newest first.
    List,
    /// Soft-deleted matches.
    Deleted,
    /// One match by id, with its stat lines.
    Show { id: i32 },
    /// Insert a match.
    Add(MatchFields),
    /// Replace every field of a match.
    Update(MatchFields),
    /// Soft-delete a match and its stat lines.
    Delete { id: i32 },
    /// Restore a soft-deleted match and stat lines.
    Restore { id: i32 },
    /// Matches a team played on either side.
    ByTeam { team_id: i32 },
    /// Matches on one calendar day, YYYY-MM-DD.
    OnDate { date: String },
    /// Matches within an inclusive date range.
    Range { start: String, end: String },
}

#[derive(Args)]
struct MatchFields {
    #[arg(long)]
    id: i32,
    #[arg(long)]
    season: String,
    #[arg(long)]
    match_type: String,
    /// Tip-off, "YYYY-MM-DD HH:MM" or YYYY-MM-DD.
    #[arg(long)]
    date: String,
    #[arg(long)]
    home: i32,
    #[arg(long)]
    away: i32,
    #[arg(long, default_value_t = 0)]
    home_score: i32,
    #[arg(long, default_value_t = 0)]
    away_score: i32,
}

impl MatchFields {
    fn into_match(self) -> Result<Match> {
        Ok(Match {
            match_id: self.id,
            season: self.season,
            match_type: self.match_type,
            game_date: parse_datetime(&self.date)?,
            home_team_id: self.home,
            away_team_id: self.away,
            home_score: self.home_score,
            away_score: self.away_score,
            deleted: false,
        })
    }
}

#[derive(Args)]
struct StatCmd {
    #[command(subcommand)]
    sub: StatSub,
}

#[derive(Subcommand)]
enum StatSub {
    /// Non-deleted stat lines, points order.
    List,
    /// Soft-deleted stat lines.
    Deleted,
    /// One stat line by id.
    Show { id: i32 },
    /// Validate and record one stat line.
    Add(StatFields),
    /// Update the counters of an existing stat line.
    Update(StatFields),
    /// Soft-delete a stat line.
    Delete { id: i32 },
    /// Restore a soft-deleted stat line.
    Restore { id: i32 },
    /// Validate and record a batch from a TOML file, all or nothing.
    Bulk {
        #[arg(long, value_name = "FILE")]
        file: String,
        /// Accept off-roster players without prompting.
        #[arg(long)]
        allow_off_roster: bool,
    },
    /// Stat lines of one match, points order.
    ByMatch { match_id: i32 },
    /// Stat lines of one player, newest match first.
    ByPlayer { player_id: i32 },
}

#[derive(Args)]
struct StatFields {
    #[arg(long)]
    id: i32,
    #[arg(long = "match")]
    match_id: i32,
    #[arg(long)]
    player: i32,
    #[arg(long)]
    points: Option<i32>,
    #[arg(long)]
    rebounds: Option<i32>,
    #[arg(long)]
    assists: Option<i32>,
    #[arg(long)]
    steals: Option<i32>,
    #[arg(long)]
    blocks: Option<i32>,
    #[arg(long)]
    turnovers: Option<i32>,
    #[arg(long)]
    minutes: Option<i32>,
    /// Accept an off-roster player without prompting.
    #[arg(long)]
    allow_off_roster: bool,
    /// Answer yes to the off-roster prompt.
    #[arg(long)]
    yes: bool,
}

impl StatFields {
    fn input(&self) -> NewStatisticInput {
        NewStatisticInput {
            stats_id: self.id,
            match_id: self.match_id,
            player_id: self.player,
            points: self.points,
            rebounds: self.rebounds,
            assists: self.assists,
            steals: self.steals,
            blocks: self.blocks,
            turnovers: self.turnovers,
            minutes_played: self.minutes,
        }
    }
}

#[derive(Args)]
struct ArenaCmd {
    #[command(subcommand)]
    sub: ArenaSub,
}

#[derive(Subcommand)]
enum ArenaSub {
    /// Change an arena's capacity; the change is audited.
    Capacity {
        #[arg(long)]
        arena: i32,
        #[arg(long)]
        capacity: i32,
    },
}

#[derive(Args)]
struct UserCmd {
    #[command(subcommand)]
    sub: UserSub,
}

#[derive(Subcommand)]
enum UserSub {
    /// Upsert accounts from a TOML seed file.
    Seed {
        #[arg(long, value_name = "FILE")]
        file: String,
    },
    /// Register one account.
    Add {
        #[arg(long)]
        username: String,
        /// Admin, Developer, or Analyst.
        #[arg(long)]
        role: String,
        #[arg(long)]
        new_password: String,
    },
}

/// One `[[statistics]]` block of a bulk file.
#[derive(Debug, Deserialize)]
struct BulkStat {
    stats_id: i32,
    match_id: i32,
    player_id: i32,
    points: Option<i32>,
    rebounds: Option<i32>,
    assists: Option<i32>,
    steals: Option<i32>,
    blocks: Option<i32>,
    turnovers: Option<i32>,
    minutes_played: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct BulkFile {
    statistics: Vec<BulkStat>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConsoleConfig::from_env()?;

    if let Cmd::Migrate = cli.cmd {
        courtdb::db::migrate::run_sqlite(&config.database_url)?;
        println!("migrations applied");
        return Ok(());
    }

    let mut conn = courtdb::db::connection::connect_sqlite(&config.database_url)?;
    let permission = required_permission(&cli.cmd);
    authorize(&mut conn, cli.user.as_deref(), cli.password.as_deref(), permission)?;

    match cli.cmd {
        Cmd::Migrate => unreachable!("handled before authentication"),
        Cmd::Team(TeamCmd { sub }) => run_team(&mut conn, sub)?,
        Cmd::Player(PlayerCmd { sub }) => run_player(&mut conn, sub, config.page_size)?,
        Cmd::Coach(CoachCmd { sub }) => run_coach(&mut conn, sub)?,
        Cmd::Match(MatchCmd { sub }) => run_match(&mut conn, sub)?,
        Cmd::Stat(StatCmd { sub }) => run_stat(&mut conn, sub)?,
        Cmd::Trade { player, team } => {
            let moved = ops::trade_player(&mut conn, player, team)?;
            println!(
                "traded {} {} to team {}",
                moved.first_name, moved.last_name, moved.team_id
            );
        }
        Cmd::Arena(ArenaCmd {
            sub: ArenaSub::Capacity { arena, capacity },
        }) => {
            let updated = ops::update_arena_capacity(&mut conn, arena, capacity)?;
            println!("{} now holds {}", updated.arena_name, updated.capacity);
        }
        Cmd::User(UserCmd { sub }) => run_user(&mut conn, sub)?,
        Cmd::Standings => {
            for row in reports::team_standings(&mut conn)? {
                println!(
                    "{:>4}  {:<28} {:>2}W {:>2}L  for {:>5.1}  against {:>5.1}  roster {}",
                    row.team_id,
                    row.team_name,
                    row.wins,
                    row.losses,
                    row.avg_points_for,
                    row.avg_points_against,
                    row.player_count
                );
            }
        }
    }

    Ok(())
}

/// The permission a command is gated on. `Migrate` never reaches here.
fn required_permission(cmd: &Cmd) -> Permission {
    match cmd {
        Cmd::Migrate => Permission::View,
        Cmd::Team(TeamCmd { sub }) => match sub {
            TeamSub::List | TeamSub::Show { .. } => Permission::View,
            TeamSub::Deleted => Permission::Restore,
            TeamSub::Add(_) => Permission::Create,
            TeamSub::Update(_) => Permission::Edit,
            TeamSub::Delete { .. } => Permission::SoftDelete,
            TeamSub::Restore { .. } => Permission::Restore,
        },
        Cmd::Player(PlayerCmd { sub }) => match sub {
            PlayerSub::List
            | PlayerSub::Show { .. }
            | PlayerSub::Search { .. }
            | PlayerSub::Top { .. }
            | PlayerSub::Page { .. } => Permission::View,
            PlayerSub::Deleted => Permission::Restore,
            PlayerSub::Add(_) => Permission::Create,
            PlayerSub::Update(_) => Permission::Edit,
            PlayerSub::Delete { .. } => Permission::SoftDelete,
            PlayerSub::Restore { .. } => Permission::Restore,
            PlayerSub::HardDelete { .. } => Permission::HardDelete,
        },
        Cmd::Coach(CoachCmd { sub }) => match sub {
            CoachSub::List | CoachSub::Show { .. } => Permission::View,
            CoachSub::Deleted => Permission::Restore,
            CoachSub::Add(_) => Permission::Create,
            CoachSub::Update(_) => Permission::Edit,
            CoachSub::Delete { .. } => Permission::SoftDelete,
            CoachSub::Restore { .. } => Permission::Restore,
        },
        Cmd::Match(MatchCmd { sub }) => match sub {
            MatchSub::List
            | MatchSub::Show { .. }
            | MatchSub::ByTeam { .. }
            | MatchSub::OnDate { .. }
            | MatchSub::Range { .. } => Permission::View,
            MatchSub::Deleted => Permission::Restore,
            MatchSub::Add(_) => Permission::Create,
            MatchSub::Update(_) => Permission::Edit,
            MatchSub::Delete { .. } => Permission::SoftDelete,
            MatchSub::Restore { .. } => Permission::Restore,
        },
        Cmd::Stat(StatCmd { sub }) => match sub {
            StatSub::List
            | StatSub::Show { .. }
            | StatSub::ByMatch { .. }
            | StatSub::ByPlayer { .. } => Permission::View,
            StatSub::Deleted => Permission::Restore,
            StatSub::Add(_) | StatSub::Bulk { .. } => Permission::Create,
            StatSub::Update(_) => Permission::Edit,
            StatSub::Delete { .. } => Permission::SoftDelete,
            StatSub::Restore { .. } => Permission::Restore,
        },
        Cmd::Trade { .. } => Permission::Edit,
        Cmd::Arena(_) => Permission::Edit,
        Cmd::User(_) => Permission::ManageUsers,
        Cmd::Standings => Permission::RunReports,
    }
}

/// Authenticates the caller and checks the role matrix. An unprovisioned
/// store (no accounts at all) lets `ManageUsers` through so the first
/// admin can be seeded.
fn authorize(
    conn: &mut diesel::SqliteConnection,
    user: Option<&str>,
    password: Option<&str>,
    permission: Permission,
) -> Result<()> {
    if permission == Permission::ManageUsers && auth::user_count(conn)? == 0 {
        tracing::warn!("no accounts exist, allowing unauthenticated user management");
        return Ok(());
    }

    let username = user
        .map(str::to_string)
        .or_else(|| get_env_var_opt("COURTDB_USER"))
        .context("no username given (--user or COURTDB_USER)")?;
    let password = password
        .map(str::to_string)
        .or_else(|| get_env_var_opt("COURTDB_PASSWORD"))
        .context("no password given (--password or COURTDB_PASSWORD)")?;

    let Some(account) = auth::authenticate(conn, &username, &password)? else {
        bail!("authentication failed for {username}");
    };
    let role: Role = account.role.parse()?;
    if !role.allows(permission) {
        bail!("role {role} may not perform this operation");
    }
    Ok(())
}

fn run_team(conn: &mut diesel::SqliteConnection, sub: TeamSub) -> Result<()> {
    match sub {
        TeamSub::List => {
            for roster in repo::team::list(conn)? {
                print_team(&roster);
            }
        }
        TeamSub::Deleted => {
            for roster in repo::team::list_deleted(conn)? {
                print_team(&roster);
            }
        }
        TeamSub::Show { id } => match repo::team::get_by_id(conn, id)? {
            Some(roster) => {
                print_team(&roster);
                for player in &roster.players {
                    println!(
                        "    #{:<3} {} {} ({})",
                        player.jersey_number, player.first_name, player.last_name, player.position
                    );
                }
                for coach in &roster.coaches {
                    println!("    {} {} [{}]", coach.first_name, coach.last_name, coach.role);
                }
            }
            None => println!("team {id} not found"),
        },
        TeamSub::Add(fields) => {
            let team = repo::team::create(conn, &fields.into_team()?)?;
            println!("created team {} ({})", team.team_id, team.team_name);
        }
        TeamSub::Update(fields) => {
            let team = repo::team::update(conn, &fields.into_team()?)?;
            println!("updated team {}", team.team_id);
        }
        TeamSub::Delete { id } => report_flag(repo::team::delete(conn, id)?, "team", id, "deleted"),
        TeamSub::Restore { id } => {
            report_flag(repo::team::restore(conn, id)?, "team", id, "restored")
        }
    }
    Ok(())
}

fn run_player(conn: &mut diesel::SqliteConnection, sub: PlayerSub, page_size: i64) -> Result<()> {
    match sub {
        PlayerSub::List => {
            for detail in repo::player::list(conn)? {
                print_player(&detail);
            }
        }
        PlayerSub::Deleted => {
            for detail in repo::player::list_deleted(conn)? {
                print_player(&detail);
            }
        }
        PlayerSub::Show { id } => match repo::player::get_by_id(conn, id)? {
            Some(detail) => {
                print_player(&detail);
                for stat in &detail.statistics {
                    println!(
                        "    match {}: {} pts, {} reb, {} ast",
                        stat.match_id,
                        stat.points.unwrap_or(0),
                        stat.rebounds.unwrap_or(0),
                        stat.assists.unwrap_or(0)
                    );
                }
            }
            None => println!("player {id} not found"),
        },
        PlayerSub::Add(fields) => {
            let player = repo::player::create(conn, &fields.into_player()?)?;
            println!(
                "created player {} ({} {})",
                player.player_id, player.first_name, player.last_name
            );
        }
        PlayerSub::Update(fields) => {
            let player = repo::player::update(conn, &fields.into_player()?)?;
            println!("updated player {}", player.player_id);
        }
        PlayerSub::Delete { id } => {
            report_flag(repo::player::delete(conn, id)?, "player", id, "deleted")
        }
        PlayerSub::Restore { id } => {
            report_flag(repo::player::restore(conn, id)?, "player", id, "restored")
        }
        PlayerSub::HardDelete {
            id,
            require_clean,
            yes,
        } => {
            if !yes && !confirm(&format!("Permanently remove player {id}? This cannot be undone."))?
            {
                bail!(courtdb::error::ValidationError::Cancelled);
            }
            let policy = if require_clean {
                HardDeletePolicy::RequireNoStatistics
            } else {
                HardDeletePolicy::KeepStatistics
            };
            report_flag(
                repo::player::hard_delete(conn, id, policy)?,
                "player",
                id,
                "permanently removed",
            );
        }
        PlayerSub::Search { term } => {
            for detail in repo::player::search(conn, &term)? {
                print_player(&detail);
            }
        }
        PlayerSub::Top { n } => {
            for (rank, (player, points)) in repo::player::top_scorers(conn, n)?.iter().enumerate() {
                println!(
                    "{:>2}. {} {} ({} pts)",
                    rank + 1,
                    player.first_name,
                    player.last_name,
                    points
                );
            }
        }
        PlayerSub::Page {
            page,
            team,
            position,
            search,
        } => {
            let filter = PageFilter {
                team,
                position,
                search,
            };
            for detail in repo::player::paged(conn, page, page_size, &filter)? {
                print_player(&detail);
            }
        }
    }
    Ok(())
}

fn run_coach(conn: &mut diesel::SqliteConnection, sub: CoachSub) -> Result<()> {
    match sub {
        CoachSub::List => {
            for detail in repo::coach::list(conn)? {
                print_coach(&detail);
            }
        }
        CoachSub::Deleted => {
            for detail in repo::coach::list_deleted(conn)? {
                print_coach(&detail);
            }
        }
        CoachSub::Show { id } => match repo::coach::get_by_id(conn, id)? {
            Some(detail) => print_coach(&detail),
            None => println!("coach {id} not found"),
        },
        CoachSub::Add(fields) => {
            let coach = repo::coach::create(conn, &fields.into_coach()?)?;
            println!(
                "created coach {} ({} {})",
                coach.coach_id, coach.first_name, coach.last_name
            );
        }
        CoachSub::Update(fields) => {
            let coach = repo::coach::update(conn, &fields.into_coach()?)?;
            println!("updated coach {}", coach.coach_id);
        }
        CoachSub::Delete { id } => {
            report_flag(repo::coach::delete(conn, id)?, "coach", id, "deleted")
        }
        CoachSub::Restore { id } => {
            report_flag(repo::coach::restore(conn, id)?, "coach", id, "restored")
        }
    }
    Ok(())
}

fn run_match(conn: &mut diesel::SqliteConnection, sub: MatchSub) -> Result<()> {
    match sub {
        MatchSub::List => {
            for detail in repo::matches::list(conn)? {
                print_match(&detail.game);
            }
        }
        MatchSub::Deleted => {
            for detail in repo::matches::list_deleted(conn)? {
                print_match(&detail.game);
            }
        }
        MatchSub::Show { id } => match repo::matches::get_by_id(conn, id)? {
            Some(detail) => {
                print_match(&detail.game);
                for (stat, player) in &detail.lines {
                    println!(
                        "    {} {}: {} pts, {} reb, {} ast",
                        player.first_name,
                        player.last_name,
                        stat.points.unwrap_or(0),
                        stat.rebounds.unwrap_or(0),
                        stat.assists.unwrap_or(0)
                    );
                }
            }
            None => println!("match {id} not found"),
        },
        MatchSub::Add(fields) => {
            let game = repo::matches::create(conn, &fields.into_match()?)?;
            println!("created match {}", game.match_id);
        }
        MatchSub::Update(fields) => {
            let game = repo::matches::update(conn, &fields.into_match()?)?;
            println!("updated match {}", game.match_id);
        }
        MatchSub::Delete { id } => {
            report_flag(repo::matches::delete(conn, id)?, "match", id, "deleted")
        }
        MatchSub::Restore { id } => {
            report_flag(repo::matches::restore(conn, id)?, "match", id, "restored")
        }
        MatchSub::ByTeam { team_id } => {
            for detail in repo::matches::by_team(conn, team_id)? {
                print_match(&detail.game);
            }
        }
        MatchSub::OnDate { date } => {
            for detail in repo::matches::on_date(conn, parse_date(&date)?)? {
                print_match(&detail.game);
            }
        }
        MatchSub::Range { start, end } => {
            for detail in repo::matches::in_range(conn, parse_date(&start)?, parse_date(&end)?)? {
                print_match(&detail.game);
            }
        }
    }
    Ok(())
}

fn run_stat(conn: &mut diesel::SqliteConnection, sub: StatSub) -> Result<()> {
    match sub {
        StatSub::List => {
            for line in repo::statistic::list(conn)? {
                print_stat_line(&line);
            }
        }
        StatSub::Deleted => {
            for line in repo::statistic::list_deleted(conn)? {
                print_stat_line(&line);
            }
        }
        StatSub::Show { id } => match repo::statistic::get_by_id(conn, id)? {
            Some(line) => print_stat_line(&line),
            None => println!("statistic {id} not found"),
        },
        StatSub::Add(fields) => {
            let input = fields.input();
            let stat = validate_with_prompt(conn, &input, fields.allow_off_roster, fields.yes)?;
            let stat = stats::create_statistic(conn, &stat)?;
            println!("recorded statistic {}", stat.stats_id);
        }
        StatSub::Update(fields) => {
            let input = fields.input();
            let stat = courtdb::models::Statistic {
                stats_id: input.stats_id,
                match_id: input.match_id,
                player_id: input.player_id,
                points: input.points,
                rebounds: input.rebounds,
                assists: input.assists,
                steals: input.steals,
                blocks: input.blocks,
                turnovers: input.turnovers,
                minutes_played: input.minutes_played,
                deleted: false,
            };
            let stat = stats::update_statistic(conn, &stat)?;
            println!("updated statistic {}", stat.stats_id);
        }
        StatSub::Delete { id } => report_flag(
            stats::delete_statistic(conn, id)?,
            "statistic",
            id,
            "deleted",
        ),
        StatSub::Restore { id } => report_flag(
            repo::statistic::restore(conn, id)?,
            "statistic",
            id,
            "restored",
        ),
        StatSub::Bulk {
            file,
            allow_off_roster,
        } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading batch file {file}"))?;
            let batch: BulkFile = toml::from_str(&raw)?;
            let opts = ValidationOptions { allow_off_roster };

            let inputs: Vec<NewStatisticInput> = batch
                .statistics
                .iter()
                .map(|entry| NewStatisticInput {
                    stats_id: entry.stats_id,
                    match_id: entry.match_id,
                    player_id: entry.player_id,
                    points: entry.points,
                    rebounds: entry.rebounds,
                    assists: entry.assists,
                    steals: entry.steals,
                    blocks: entry.blocks,
                    turnovers: entry.turnovers,
                    minutes_played: entry.minutes_played,
                })
                .collect();
            let rows = validate_statistic_batch(conn, &inputs, opts)?;
            let committed = stats::create_bulk(conn, &rows)?;
            println!("recorded {} statistics", committed.len());
        }
        StatSub::ByMatch { match_id } => {
            for line in repo::statistic::by_match(conn, match_id)? {
                print_stat_line(&line);
            }
        }
        StatSub::ByPlayer { player_id } => {
            for line in repo::statistic::by_player(conn, player_id)? {
                print_stat_line(&line);
            }
        }
    }
    Ok(())
}

fn run_user(conn: &mut diesel::SqliteConnection, sub: UserSub) -> Result<()> {
    match sub {
        UserSub::Seed { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading seed file {file}"))?;
            let seeds: auth::UserSeedFile = toml::from_str(&raw)?;
            let applied = auth::seed_users(conn, &seeds.users)?;
            println!("seeded {applied} account(s)");
        }
        UserSub::Add {
            username,
            role,
            new_password,
        } => {
            let role: Role = role.parse()?;
            let account = auth::register(conn, &username, &new_password, role)?;
            println!("registered {} as {}", account.username, account.role);
        }
    }
    Ok(())
}

/// Runs the validation pipeline, prompting the operator when the player is
/// off-roster. Declining the prompt cancels the whole operation.
fn validate_with_prompt(
    conn: &mut diesel::SqliteConnection,
    input: &NewStatisticInput,
    allow_off_roster: bool,
    assume_yes: bool,
) -> Result<courtdb::models::Statistic> {
    let opts = ValidationOptions { allow_off_roster };
    match validate_new_statistic(conn, input, opts) {
        Ok(stat) => Ok(stat),
        Err(err) => {
            let off_roster = matches!(
                err.downcast_ref::<courtdb::error::ValidationError>(),
                Some(courtdb::error::ValidationError::OffRoster { .. })
            );
            if !off_roster {
                return Err(err);
            }
            eprintln!("{err}");
            if assume_yes || confirm("Record the statistic anyway?")? {
                validate_new_statistic(conn, input, ValidationOptions {
                    allow_off_roster: true,
                })
            } else {
                Err(courtdb::error::ValidationError::Cancelled.into())
            }
        }
    }
}

/// Yes/no prompt on stdin; anything but y/yes declines.
fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

fn report_flag(done: bool, entity: &str, id: i32, verb: &str) {
    if done {
        println!("{entity} {id} {verb}");
    } else {
        println!("{entity} {id}: nothing to do");
    }
}

fn print_team(roster: &courtdb::models::TeamRoster) {
    println!(
        "{:>4}  {:<28} [{}]  {} / {}  at {} ({} seats)",
        roster.team.team_id,
        roster.team.team_name,
        roster.team.abbreviation,
        roster.division.division_name,
        roster.team.conference_id,
        roster.arena.arena_name,
        roster.arena.capacity
    );
}

fn print_player(detail: &courtdb::models::PlayerDetail) {
    println!(
        "{:>4}  {} {}  #{} {} ({}), {}",
        detail.player.player_id,
        detail.player.first_name,
        detail.player.last_name,
        detail.player.jersey_number,
        detail.player.position,
        detail.team.team_name,
        detail.player.country
    );
}

fn print_coach(detail: &courtdb::models::CoachDetail) {
    println!(
        "{:>4}  {} {}  [{}] {} since {}",
        detail.coach.coach_id,
        detail.coach.first_name,
        detail.coach.last_name,
        detail.coach.role,
        detail.team.team_name,
        detail.coach.start_date
    );
}

fn print_match(game: &Match) {
    println!(
        "{:>4}  {}  {} vs {}  {}:{}  ({}, {})",
        game.match_id,
        game.game_date,
        game.home_team_id,
        game.away_team_id,
        game.home_score,
        game.away_score,
        game.season,
        game.match_type
    );
}

fn print_stat_line(line: &courtdb::models::StatLine) {
    let who = match &line.player {
        Some(player) => format!("{} {}", player.first_name, player.last_name),
        None => format!("player {} (removed)", line.stat.player_id),
    };
    println!(
        "{:>4}  {}  match {}  {} pts, {} reb, {} ast, {} min",
        line.stat.stats_id,
        who,
        line.stat.match_id,
        line.stat.points.unwrap_or(0),
        line.stat.rebounds.unwrap_or(0),
        line.stat.assists.unwrap_or(0),
        line.stat.minutes_played.unwrap_or(0)
    );
}

/// Parses YYYY-MM-DD.
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

/// Parses "YYYY-MM-DD HH:MM", "YYYY-MM-DDTHH:MM", or a bare date
/// (midnight).
fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        return Ok(dt);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date/time: {s}"))?;
    Ok(date.and_time(NaiveTime::MIN))
}
