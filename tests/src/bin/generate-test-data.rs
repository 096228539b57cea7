use chrono::{Duration, Utc};
use forum_client::{
    api::{self, CommentId, CommentList},
    AvatarGenerator, RandomAvatars,
};
use rand::{seq::SliceRandom, Rng};

const NUM_USERS: usize = 5;

const NUM_ROOTS: u64 = 20;
const NUM_REPLIES: u64 = 40;

const MAX_AGE_MINUTES: i64 = 60 * 24 * 60;
const MAX_UPVOTES: u32 = 25;

const COMMENT_MIN_WORDS: usize = 4;
const COMMENT_MAX_WORDS: usize = 40;

fn gen_comment_text(rng: &mut impl Rng) -> String {
    loop {
        let words = rng.gen_range(COMMENT_MIN_WORDS..=COMMENT_MAX_WORDS);
        let text = lipsum::lipsum_words_with_rng(&mut *rng, words);
        let text = text.chars().take(api::MAX_COMMENT_LEN).collect::<String>();
        if api::validate_comment_text(&text).is_ok() {
            return text;
        }
    }
}

fn main() {
    let mut rng = rand::thread_rng();
    let mut avatars = RandomAvatars::new();
    let users = (0..NUM_USERS)
        .map(|_| {
            let name = lipsum::lipsum_words_with_rng(&mut rng, 1);
            let name = name.trim_end_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            (name, avatars.generate())
        })
        .collect::<Vec<_>>();
    let now = Utc::now();

    let mut comments = Vec::new();
    for id in 1..=(NUM_ROOTS + NUM_REPLIES) {
        let (username, avatar) = users
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| (String::from(api::DEFAULT_USERNAME), String::new()));
        // replies always point at an earlier root, so they are also younger than it
        let (parent, max_age) = match id > NUM_ROOTS {
            false => (None, MAX_AGE_MINUTES),
            true => {
                let parent: &api::Comment = &comments[rng.gen_range(0..NUM_ROOTS as usize)];
                let parent_age = now
                    - forum_client::parse_time(&parent.comment_date)
                        .expect("generated dates always parse");
                (parent.id, parent_age.num_minutes())
            }
        };
        let age = Duration::minutes(rng.gen_range(0..=max_age));
        comments.push(api::Comment {
            id: Some(CommentId(id)),
            username,
            avatar,
            comment_date: api::format_time(&(now - age)),
            comment_text: gen_comment_text(&mut rng),
            upvotes: rng.gen_range(0..=MAX_UPVOTES),
            parent_comment_id: parent,
        });
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&CommentList { comments })
            .expect("serializing generated comments")
    );
}
