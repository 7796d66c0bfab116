use chrono::NaiveDate;

use crate::model::{Member, PerformanceRecord, Role, avatar_url};

/// Demo roster loaded at startup.
pub fn seed_members() -> Vec<Member> {
    vec![
        seed_member(
            "1",
            "Nguyễn Văn An",
            "vanan@example.com",
            "vana",
            &["Project Management", "Communication", "Technical Support"],
            &["Problem Solving", "Leadership"],
            (2023, 1, 15),
            vec![
                record(
                    "Tech Summit 2023",
                    Role::Coordinator,
                    5,
                    "Excellent leadership under pressure.",
                ),
                record(
                    "Annual Gala",
                    Role::Technical,
                    4,
                    "Handled sound and lighting flawlessly.",
                ),
            ],
        ),
        seed_member(
            "2",
            "Lê Thị Bình",
            "thibinh@example.com",
            "thib",
            &["Graphic Design", "Social Media", "Content Creation"],
            &["Creativity", "Attention to Detail"],
            (2023, 5, 20),
            vec![
                record(
                    "Art Exhibition",
                    Role::Designer,
                    5,
                    "Very striking visual identity.",
                ),
                record(
                    "Charity Run",
                    Role::Marketing,
                    3,
                    "Good ideas but post timing was off.",
                ),
            ],
        ),
        seed_member(
            "3",
            "Trần Văn Cường",
            "vancuong@example.com",
            "vanc",
            &["Public Speaking", "Hosting", "Storytelling"],
            &["Charisma", "Approachable"],
            (2023, 8, 10),
            vec![record(
                "Talent Night",
                Role::Host,
                5,
                "Connected with the crowd extremely well.",
            )],
        ),
        seed_member(
            "4",
            "Phạm Minh Đức",
            "minhduc@example.com",
            "minhd",
            &["Logistics", "Vendor Management", "Security"],
            &["Well Organized", "Reliable"],
            (2023, 11, 2),
            vec![record(
                "Music Festival",
                Role::Logistics,
                4,
                "Backstage coordination ran smoothly.",
            )],
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed_member(
    id: &str,
    name: &str,
    email: &str,
    avatar_seed: &str,
    skills: &[&str],
    strengths: &[&str],
    joined: (i32, u32, u32),
    history: Vec<PerformanceRecord>,
) -> Member {
    let (y, m, d) = joined;
    Member {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        avatar: avatar_url(avatar_seed),
        skills: skills.iter().map(|s| s.to_string()).collect(),
        strengths: strengths.iter().map(|s| s.to_string()).collect(),
        history,
        joined_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
    }
}

fn record(event: &str, role: Role, rating: u8, feedback: &str) -> PerformanceRecord {
    PerformanceRecord {
        event_name: event.to_string(),
        role,
        rating,
        feedback: feedback.to_string(),
    }
}
