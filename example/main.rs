use ctxkit::{App, Ctx, ReadExt, Reply, Source};
use http::StatusCode;
use serde::Serialize;
use serde_json::json;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    routes().listen("0.0.0.0:3000").await
}

fn routes() -> App {
    let mut app = App::new();
    app.get("/", index);

    let mut api = app.group("/api");
    api.get("/users/:id", user)
        .get("/users", users)
        .post("/users", add_user)
        .get("/whoami", whoami);
    app
}

// ===== Routes =====

fn index(ctx: &mut Ctx) -> ctxkit::Result<()> {
    let title = ctx.get_str("title", Some("ctxkit"));
    ctx.set_type("html", Some("utf-8"));
    ctx.send_fmt(format_args!("<h1>{title}</h1>"));
    Ok(())
}

fn user(ctx: &mut Ctx) -> ctxkit::Result<()> {
    let id = ctx.param_int("id", None);
    if id <= 0 {
        let raw = ctx.param_str("id", None);
        ctx.errorf(1001, format_args!("invalid user id {raw:?}"))?;
        return Ok(());
    }
    ctx.reply(Reply::data(&User { id, name: format!("user-{id}") })?, None)?;
    Ok(())
}

fn users(ctx: &mut Ctx) -> ctxkit::Result<()> {
    let page = ctx.get_int("page", Some(1)).max(1);
    let size = ctx.get_int("size", Some(20)).clamp(1, 100);
    let users = (0..size)
        .map(|i| User { id: (page - 1) * size + i + 1, name: String::new() })
        .collect::<Vec<_>>();
    ctx.reply(Reply::data(&users)?, Some(1000))?;
    Ok(())
}

fn add_user(ctx: &mut Ctx) -> ctxkit::Result<()> {
    if ctx.token().is_none() {
        ctx.deny("login required")?;
        return Ok(());
    }
    let form = ctx.post_all()?;
    ctx.set_status(StatusCode::CREATED);
    ctx.reply(json!({ "created": form }), None)?;
    Ok(())
}

fn whoami(ctx: &mut Ctx) -> ctxkit::Result<()> {
    let agent = ctx.header_str("user-agent", Some("unknown"));
    let bot = ctx.contains("user-agent", "bot", &[Source::Header]).unwrap_or(false);
    ctx.jsonify(format_args!("{{\"agent\":{agent:?},\"bot\":{bot}}}"));
    Ok(())
}

// ===== Models =====

#[derive(Serialize)]
struct User {
    id: i64,
    name: String,
}
