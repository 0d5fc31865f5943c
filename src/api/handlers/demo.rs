/*
 * Responsibility
 * - GET /read, /write, /user, /admin
 * - Static bodies; access is decided entirely by the route policy before these run
 */

pub async fn read() -> &'static str {
    "Welcome to the internet, i'll be your guide"
}

pub async fn write() -> &'static str {
    "I know kung fu!"
}

pub async fn user() -> &'static str {
    "You can't judge me, i am justice itself"
}

pub async fn admin() -> &'static str {
    "All your base are belong to us"
}
