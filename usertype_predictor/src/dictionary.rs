use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ColumnDoc {
    pub column: &'static str,
    pub description: &'static str,
}

pub const DATA_DICTIONARY: &[ColumnDoc] = &[
    ColumnDoc {
        column: "user_type",
        description: "Whether a user is a subscriber or a customer (0 = Subscriber, 1 = Customer).",
    },
    ColumnDoc {
        column: "trip_duration",
        description: "Time spent on the bicycle in a single trip. Stored in seconds, shown in whole minutes.",
    },
    ColumnDoc {
        column: "start_station_id",
        description: "Identifier of the station where the bicycle was picked up.",
    },
    ColumnDoc {
        column: "end_station_id",
        description: "Identifier of the station where the bicycle was left.",
    },
    ColumnDoc {
        column: "age",
        description: "Age of the user.",
    },
    ColumnDoc {
        column: "gender",
        description: "Gender of the user (0 = Male, 1 = Female).",
    },
    ColumnDoc {
        column: "start_hour",
        description: "Hour of the day the trip started, 24-hour clock.",
    },
    ColumnDoc {
        column: "start_day_of_week",
        description: "Day of the week the trip started (0 = Monday ... 6 = Sunday).",
    },
    ColumnDoc {
        column: "distance",
        description: "Distance covered in meters.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FEATURE_NAMES;

    #[test]
    fn documents_every_feature() {
        for name in FEATURE_NAMES {
            assert!(DATA_DICTIONARY.iter().any(|c| c.column == name), "{name}");
        }
    }
}
