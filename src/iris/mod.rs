// Iris app - species prediction from four flower measurements
//
// - models:     Iris rows + User logins (argon2 hashed passwords)
// - classifier: pre-trained model artifact + label encoder
// - pages:      server-rendered HTML
// - routes:     axum router (server feature)

pub mod classifier;
pub mod models;
pub mod pages;

#[cfg(feature = "server")]
pub mod routes;

pub use classifier::{
    Classifier, LabelEncoder, LinearClassifier, Measurements, Predictor, FEATURE_NAMES,
};
pub use models::{
    find_user_by_email, get_all_iris, insert_iris, insert_irises, insert_user, load_iris_csv,
    Iris, User,
};
