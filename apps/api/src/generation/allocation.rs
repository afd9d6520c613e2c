//! Bullet Allocation — how many bullets a role gets, by recency rank.
//!
//! The three most recent roles get five bullets; everything older gets three.
//! The rule is always stated in prompts. It is only enforced mechanically when
//! the Document Assembler runs with `enforce_allocation`.

/// Number of most-recent roles that receive the full bullet budget.
pub const RECENT_ROLE_WINDOW: usize = 3;
pub const RECENT_ROLE_BULLETS: usize = 5;
pub const EARLIER_ROLE_BULLETS: usize = 3;

/// Roles that ended within this many years are prioritised.
pub const RECENCY_WINDOW_YEARS: i32 = 15;

/// Bullets allowed for a role. `recency_rank` is 1-based (1 = most recent);
/// a rank of 0 is treated as 1.
pub fn bullets_for(recency_rank: usize) -> usize {
    if recency_rank <= RECENT_ROLE_WINDOW {
        RECENT_ROLE_BULLETS
    } else {
        EARLIER_ROLE_BULLETS
    }
}

/// Inclusive `(from, to)` year range prompts should prioritise.
pub fn recency_window(current_year: i32) -> (i32, i32) {
    (current_year - RECENCY_WINDOW_YEARS, current_year)
}

/// Truncates `bullets` to the allocation for `recency_rank`. Returns how many were dropped.
pub fn truncate_to_allocation(recency_rank: usize, bullets: &mut Vec<String>) -> usize {
    let allowed = bullets_for(recency_rank);
    let dropped = bullets.len().saturating_sub(allowed);
    bullets.truncate(allowed);
    dropped
}

/// Prompt block stating the allocation rule.
pub fn allocation_instruction() -> String {
    format!(
        "BULLET POINT ALLOCATION (VERY IMPORTANT):\n\
         - FIRST {RECENT_ROLE_WINDOW} ROLES (most recent): {RECENT_ROLE_BULLETS} bullet points each\n\
         - ALL OTHER ROLES ({}th role and beyond): {EARLIER_ROLE_BULLETS} bullet points each",
        RECENT_ROLE_WINDOW + 1
    )
}

/// Prompt block stating the recency window.
pub fn recency_instruction(current_year: i32) -> String {
    let (from, to) = recency_window(current_year);
    format!(
        "ROLE INCLUSION STRATEGY:\n\
         - PRIORITIZE roles from the last {RECENCY_WINDOW_YEARS} years ({from}-{to})\n\
         - Include older roles only if space allows and they add significant value\n\
         - Focus on relevant, recent career progression"
    )
}
