//! Diesel schema for the generation record table.

diesel::table! {
    generation_records (id) {
        id -> Uuid,
        project_id -> Uuid,
        status -> Text,
        stage -> Nullable<Text>,
        substage -> Nullable<Text>,
        progress -> Int4,
        attempts -> Int4,
        heartbeat_at -> Nullable<Timestamptz>,
        stage_completion_map -> Jsonb,
        payload -> Jsonb,
        error_code -> Nullable<Text>,
        error_detail -> Nullable<Text>,
        source_text -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
