// File: kudos-cli/src/commands.rs

use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, bail};
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use kudos_common::models::{AvatarId, Link, Platform, ScoreTone, Streamer};
use kudos_core::{
    FormErrors, KudosConfig, Roster, StreamerForm, StreamerStore, SubmitError, VoteWidget,
};

/// Extra time a vote command waits past the debounce window for the save to land.
const FLUSH_GRACE: Duration = Duration::from_secs(10);

pub fn parse_vote(s: &str) -> Result<i64, String> {
    match s.trim().to_lowercase().as_str() {
        "up" | "+" | "+1" => Ok(1),
        "down" | "-" | "-1" => Ok(-1),
        other => Err(format!("expected 'up' or 'down', got '{}'", other)),
    }
}

pub fn parse_platform(s: &str) -> Result<Platform, String> {
    s.parse::<Platform>()
}

/// `platform=url`. The url part is kept raw; the form validates it.
pub fn parse_link(s: &str) -> Result<(Platform, String), String> {
    let (platform, url) = s
        .split_once('=')
        .ok_or_else(|| format!("expected platform=url, got '{}'", s))?;
    Ok((platform.parse::<Platform>()?, url.to_string()))
}

pub struct EditRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub links: Vec<(Platform, String)>,
    pub remove: Vec<Platform>,
}

/// Seed data for `--memory`.
pub fn demo_roster() -> Vec<Streamer> {
    vec![
        Streamer {
            streamer_id: 1690000000000,
            name: "asmongold".into(),
            description: "Reacts to everything".into(),
            score: 12,
            links: vec![
                Link::new(Platform::Twitch, "https://twitch.tv/zackrawrr"),
                Link::new(Platform::Youtube, "https://youtube.com/@asmongold"),
            ],
            avatar_id: AvatarId(0),
        },
        Streamer {
            streamer_id: 1690000000001,
            name: "limmy".into(),
            description: "Glasgow's finest".into(),
            score: -2,
            links: vec![Link::new(Platform::Twitch, "https://twitch.tv/limmy")],
            avatar_id: AvatarId(1),
        },
    ]
}

fn print_row(s: &Streamer) {
    let tone = match ScoreTone::of(s.score) {
        ScoreTone::Positive => "+",
        ScoreTone::Negative => "-",
        ScoreTone::Neutral => " ",
    };
    let platforms: Vec<&str> = s.platforms().map(|p| p.as_str()).collect();
    println!(
        "{:>15}  {}{:>5}  {:<24} [{}]",
        s.streamer_id,
        tone,
        s.score,
        s.name,
        platforms.join(", ")
    );
}

fn print_form_errors(errors: &FormErrors) {
    println!("Streamer was not saved:");
    for e in &errors.errors {
        println!("  - {}", e);
    }
}

pub async fn list(store: Arc<dyn StreamerStore>) -> anyhow::Result<()> {
    let roster = Roster::new(store);
    let streamers = roster.sync().await?;
    if streamers.is_empty() {
        println!("(no streamers yet)");
        return Ok(());
    }
    for s in &streamers {
        print_row(s);
    }
    Ok(())
}

pub async fn show(store: Arc<dyn StreamerStore>, streamer_id: i64) -> anyhow::Result<()> {
    let s = store.fetch_streamer(streamer_id).await?;
    println!("{} ({})", s.name, s.streamer_id);
    println!("  {}", s.description);
    println!("  score:  {}", s.score);
    println!("  avatar: {}", s.avatar_id.slot());
    for link in &s.links {
        println!("  {:<8} {}", link.platform.as_str(), link.link.as_deref().unwrap_or("-"));
    }
    Ok(())
}

pub async fn vote(
    store: Arc<dyn StreamerStore>,
    cfg: &KudosConfig,
    streamer_id: i64,
    votes: &[i64],
) -> anyhow::Result<()> {
    let roster = Arc::new(Roster::new(store.clone()));
    let streamer = store.fetch_streamer(streamer_id).await?;
    let mut widget = VoteWidget::mount(streamer, store, roster.clone(), cfg.votes);
    let mut alerts = widget.take_alerts();

    for delta in votes {
        let score = widget.vote(*delta)?;
        info!("Streamer {} now at {}", streamer_id, score);
    }

    let give_up = Instant::now() + cfg.votes.debounce + FLUSH_GRACE;
    while widget.has_unflushed_votes() && Instant::now() < give_up {
        if let Some(rx) = alerts.as_mut() {
            if let Ok(alert) = rx.try_recv() {
                bail!("score {} for streamer {} was not saved: {}", alert.score, alert.streamer_id, alert.message);
            }
        }
        sleep(Duration::from_millis(50)).await;
    }

    if widget.has_unflushed_votes() {
        warn!("Score {} for streamer {} was not confirmed", widget.score(), streamer_id);
        widget.unmount();
        return Err(anyhow!("vote on streamer {} was not saved", streamer_id));
    }

    roster.sync().await?;
    roster.refresh_widget(&mut widget)?;
    println!("{}: score {}", streamer_id, widget.score());
    widget.unmount();
    Ok(())
}

pub async fn create(
    store: Arc<dyn StreamerStore>,
    cfg: &KudosConfig,
    name: &str,
    description: &str,
    links: &[(Platform, String)],
) -> anyhow::Result<()> {
    let mut form = StreamerForm::new().with_save_policy(cfg.votes.save_policy);
    form.set_name(name);
    form.set_description(description);
    for (platform, url) in links {
        let id = form.links_mut().add_field(*platform)?;
        form.links_mut().set_value(id, url)?;
    }
    submit(form, store).await
}

pub async fn edit(
    store: Arc<dyn StreamerStore>,
    cfg: &KudosConfig,
    streamer_id: i64,
    req: EditRequest,
) -> anyhow::Result<()> {
    let mut form = StreamerForm::load(store.as_ref(), streamer_id)
        .await?
        .with_save_policy(cfg.votes.save_policy);

    if let Some(name) = &req.name {
        form.set_name(name);
    }
    if let Some(description) = &req.description {
        form.set_description(description);
    }
    for platform in &req.remove {
        let id = form
            .links()
            .fields()
            .iter()
            .find(|f| f.platform() == *platform)
            .map(|f| f.id())
            .ok_or_else(|| anyhow!("streamer {} has no {} link", streamer_id, platform))?;
        form.links_mut().remove_field(id)?;
    }
    for (platform, url) in &req.links {
        let existing = form
            .links()
            .fields()
            .iter()
            .find(|f| f.platform() == *platform)
            .map(|f| f.id());
        let id = match existing {
            Some(id) => id,
            None => form.links_mut().add_field(*platform)?,
        };
        form.links_mut().set_value(id, url)?;
    }
    submit(form, store).await
}

async fn submit(mut form: StreamerForm, store: Arc<dyn StreamerStore>) -> anyhow::Result<()> {
    let roster = Arc::new(Roster::new(store.clone()));
    match form.submit(store.as_ref(), roster).await {
        Ok(outcome) => {
            print_row(outcome.streamer());
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            print_form_errors(&errors);
            Err(errors.into())
        }
        Err(e) => Err(e.into()),
    }
}
