use mongodb::bson::oid::ObjectId;

/// New record identifier (24-hex ObjectId, creation ordered).
pub fn new_id() -> String {
    ObjectId::new().to_hex()
}

/// New respondent token. Random, unguessable, the only respondent credential.
pub fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}
