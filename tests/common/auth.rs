use review_backend::auth::sign_jwt_for_user;

use super::app::TestApp;

/// A fresh learner id plus a bearer header value for it.
pub fn new_learner(app: &TestApp) -> (String, String) {
    let user_id = format!("learner-{}@test.com", uuid::Uuid::new_v4().simple());
    let token = sign_jwt_for_user(&user_id, &app.config.jwt_secret, 1).expect("sign token");
    (user_id, auth_header(&token))
}

pub fn auth_header(token: &str) -> String {
    format!("Bearer {token}")
}
