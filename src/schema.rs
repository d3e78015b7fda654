table! {
    games (id) {
        id -> Int8,
        season -> Int4,
        week_number -> Int4,
        home_team -> Varchar,
        away_team -> Varchar,
        game_time -> Timestamptz,
        is_complete -> Bool,
        winner -> Nullable<Varchar>,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    picks (id) {
        id -> Int8,
        player_id -> Int8,
        pool_id -> Int8,
        week_number -> Int4,
        team_id -> Varchar,
        is_correct -> Nullable<Bool>,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    players (id) {
        id -> Int8,
        pool_id -> Int8,
        email -> Nullable<Varchar>,
        display_name -> Varchar,
        lives_remaining -> Int4,
        is_eliminated -> Bool,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    pools (id) {
        id -> Int8,
        name -> Varchar,
        starting_lives -> Int4,
        is_active -> Bool,
        current_week -> Int4,
        created_at -> Nullable<Timestamptz>,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    teams (id) {
        id -> Varchar,
        name -> Varchar,
        abbreviation -> Varchar,
        conference -> Varchar,
        division -> Varchar,
    }
}

joinable!(players -> pools (pool_id));
joinable!(picks -> players (player_id));
joinable!(picks -> pools (pool_id));
joinable!(picks -> teams (team_id));

allow_tables_to_appear_in_same_query!(games, picks, players, pools, teams,);
