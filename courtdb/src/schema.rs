//! Diesel table definitions for the league schema.

diesel::table! {
    conferences (conference_id) {
        conference_id -> Integer,
        conference_name -> Text,
    }
}

diesel::table! {
    divisions (division_id) {
        division_id -> Integer,
        conference_id -> Integer,
        division_name -> Text,
    }
}

diesel::table! {
    arenas (arena_id) {
        arena_id -> Integer,
        arena_name -> Text,
        city -> Text,
        capacity -> Integer,
    }
}

diesel::table! {
    teams (team_id) {
        team_id -> Integer,
        arena_id -> Integer,
        division_id -> Integer,
        conference_id -> Integer,
        team_name -> Text,
        abbreviation -> Text,
        year_founded -> Nullable<Date>,
        general_manager -> Nullable<Text>,
        deleted -> Bool,
    }
}

diesel::table! {
    coaches (coach_id) {
        coach_id -> Integer,
        team_id -> Integer,
        first_name -> Text,
        last_name -> Text,
        role -> Text,
        start_date -> Date,
        end_date -> Nullable<Date>,
        deleted -> Bool,
    }
}

diesel::table! {
    players (player_id) {
        player_id -> Integer,
        team_id -> Integer,
        first_name -> Text,
        last_name -> Text,
        position -> Text,
        jersey_number -> Integer,
        birth_date -> Date,
        country -> Text,
        height_cm -> Double,
        weight_kg -> Double,
        draft_year -> Integer,
        draft_round -> Integer,
        draft_pick -> Integer,
        deleted -> Bool,
    }
}

diesel::table! {
    matches (match_id) {
        match_id -> Integer,
        season -> Text,
        match_type -> Text,
        game_date -> Timestamp,
        home_team_id -> Integer,
        away_team_id -> Integer,
        home_score -> Integer,
        away_score -> Integer,
        deleted -> Bool,
    }
}

diesel::table! {
    statistics (stats_id) {
        stats_id -> Integer,
        match_id -> Integer,
        player_id -> Integer,
        points -> Nullable<Integer>,
        rebounds -> Nullable<Integer>,
        assists -> Nullable<Integer>,
        steals -> Nullable<Integer>,
        blocks -> Nullable<Integer>,
        turnovers -> Nullable<Integer>,
        minutes_played -> Nullable<Integer>,
        deleted -> Bool,
    }
}

diesel::table! {
    users (user_id) {
        user_id -> Integer,
        username -> Text,
        password_hash -> Text,
        role -> Text,
        active -> Bool,
        created_at -> Timestamp,
        last_login -> Nullable<Timestamp>,
    }
}

diesel::table! {
    player_log (log_id) {
        log_id -> Integer,
        player_id -> Integer,
        action -> Text,
        action_date -> Timestamp,
    }
}

diesel::table! {
    arena_log (log_ar_id) {
        log_ar_id -> Integer,
        arena_id -> Integer,
        action -> Text,
        action_date -> Timestamp,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    conferences,
    divisions,
    arenas,
    teams,
    coaches,
    players,
    matches,
    statistics,
    users,
    player_log,
    arena_log,
);
