// Server-rendered pages for the Iris app.

use super::classifier::Measurements;
use crate::web::{escape_html, layout};

pub const HOME_TITLE: &str = "Iris Home";

fn prediction_form(values: Option<&Measurements>) -> String {
    let value_of = |pick: fn(&Measurements) -> f64| {
        values
            .map(|m| format!(" value=\"{}\"", pick(m)))
            .unwrap_or_default()
    };

    format!(
        r#"<form method="post" action="/predict">
  <label>Sepal length <input name="sepal_length" type="number" step="0.1" min="0" required{sl}></label>
  <label>Sepal width <input name="sepal_width" type="number" step="0.1" min="0" required{sw}></label>
  <label>Petal length <input name="petal_length" type="number" step="0.1" min="0" required{pl}></label>
  <label>Petal width <input name="petal_width" type="number" step="0.1" min="0" required{pw}></label>
  <button type="submit">Predict species</button>
</form>
"#,
        sl = value_of(|m| m.sepal_length),
        sw = value_of(|m| m.sepal_width),
        pl = value_of(|m| m.petal_length),
        pw = value_of(|m| m.petal_width),
    )
}

const REGISTER_FORM: &str = r#"<h2>Create a login</h2>
<form method="post" action="/register">
  <label>Email <input name="email" type="email" required></label>
  <label>Password <input name="password" type="password" required></label>
  <button type="submit">Register</button>
</form>
"#;

/// Home page with the prediction form, optionally showing an error.
pub fn render_home(error: Option<&str>) -> String {
    let mut body = String::from("<h1>Iris Home</h1>\n");
    if let Some(message) = error {
        body.push_str(&format!("<p class=\"error\">{}</p>\n", escape_html(message)));
    }
    body.push_str("<p>Enter the flower measurements in centimetres.</p>\n");
    body.push_str(&prediction_form(None));
    body.push_str(REGISTER_FORM);
    layout(HOME_TITLE, &body)
}

pub fn render_prediction(measurements: &Measurements, species: &str) -> String {
    let body = format!(
        "<h1>Iris Home</h1>\n<p class=\"prediction\">Predicted species: <strong>{}</strong></p>\n{}",
        escape_html(species),
        prediction_form(Some(measurements)),
    );
    layout("Iris Prediction", &body)
}

pub fn render_registered(email: &str) -> String {
    let body = format!(
        "<h1>Welcome</h1>\n<p>Account created for {}.</p>\n<p><a href=\"/\">Back to Iris Home</a></p>\n",
        escape_html(email)
    );
    layout("Registered", &body)
}

pub fn render_register_error(message: &str) -> String {
    let body = format!(
        "<h1>Registration failed</h1>\n<p class=\"error\">{}</p>\n{}",
        escape_html(message),
        REGISTER_FORM
    );
    layout("Registration failed", &body)
}
