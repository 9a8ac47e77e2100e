use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "flex flex-col gap-4 rounded-3xl border border-white/40 bg-white/70 py-6 text-zinc-900 shadow-2xl backdrop-blur-xl dark:border-zinc-800 dark:bg-zinc-900/70 dark:text-zinc-100"}
    clx! {CardHeader, div, "flex flex-col items-start gap-1.5 px-6"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardDescription, p, "text-sm text-zinc-500 dark:text-zinc-400"}
    clx! {CardContent, div, "px-6"}
    clx! {CardFooter, footer, "flex items-center px-6", "gap-2"}
}

#[allow(unused_imports)]
pub use components::*;
