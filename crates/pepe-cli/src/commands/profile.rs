use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pepe_core::runner::format_kg;
use pepe_core::state::{AppDataPatch, AppStore, Profile};

use crate::app::AppContext;

/// Fields to change; omitted flags keep their value.
#[derive(Args, Debug, Default)]
pub struct ProfileUpdate {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long)]
    pub height_cm: Option<f64>,
    #[arg(long)]
    pub weight_kg: Option<f64>,
    #[arg(long)]
    pub goals: Option<String>,
}

impl ProfileUpdate {
    fn apply(self, profile: &mut Profile) {
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(age) = self.age {
            profile.age = Some(age);
        }
        if let Some(height) = self.height_cm {
            profile.height_cm = Some(height);
        }
        if let Some(weight) = self.weight_kg {
            profile.weight_kg = Some(weight);
        }
        if let Some(goals) = self.goals {
            profile.goals = goals;
        }
    }
}

pub async fn show(ctx: &AppContext) -> Result<()> {
    print_profile(&ctx.store.get().await.profile);
    Ok(())
}

pub async fn set(ctx: &AppContext, update: ProfileUpdate) -> Result<()> {
    let mut profile = ctx.store.get().await.profile;
    update.apply(&mut profile);

    let data = ctx.store.set(AppDataPatch::profile(profile)).await?;
    println!("{}", "Profile saved.".green());
    print_profile(&data.profile);
    Ok(())
}

fn print_profile(profile: &Profile) {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    let name = if profile.name.is_empty() { "-" } else { profile.name.as_str() };
    println!("{} {}", "Name:".bold(), name);
    println!("{} {}", "Age:".bold(), or_dash(profile.age.map(|a| a.to_string())));
    println!(
        "{} {}",
        "Height:".bold(),
        or_dash(profile.height_cm.map(|h| format!("{} cm", format_kg(h))))
    );
    println!(
        "{} {}",
        "Weight:".bold(),
        or_dash(profile.weight_kg.map(|w| format!("{} kg", format_kg(w))))
    );
    println!("{} {:?}", "Experience:".bold(), profile.experience_level);
    println!("{} {:?}", "Activity:".bold(), profile.sedentary_level);
    println!("{} {}", "Goals:".bold(), if profile.goals.is_empty() { "-" } else { &profile.goals });
}
