use super::LineContext;
use crate::combat_log::record::{ChatChannel, ChatRecord};
use crate::context::intern;
use memchr::memmem;

/// A channel keyword must start within this many bytes of the action text.
pub(crate) const CHAT_KEYWORD_WINDOW: usize = 16;

const QUOTE_LEAD: &str = ", '";

#[derive(Clone, Copy)]
enum Channel {
    Say,
    Tell,
    Shout,
    Ooc,
    Auction,
    Guild,
    Group,
    Raid,
    Fellowship,
}

impl Channel {
    fn into_chat(self) -> ChatChannel {
        match self {
            Channel::Say => ChatChannel::Say,
            Channel::Tell => ChatChannel::Tell,
            Channel::Shout => ChatChannel::Shout,
            Channel::Ooc => ChatChannel::Ooc,
            Channel::Auction => ChatChannel::Auction,
            Channel::Guild => ChatChannel::Guild,
            Channel::Group => ChatChannel::Group,
            Channel::Raid => ChatChannel::Raid,
            Channel::Fellowship => ChatChannel::Fellowship,
        }
    }
}

/// Phrases following "You " up to the opening quote.
const SELF_PHRASES: [(&str, Channel); 8] = [
    ("say, '", Channel::Say),
    ("say to your guild, '", Channel::Guild),
    ("say out of character, '", Channel::Ooc),
    ("tell your party, '", Channel::Group),
    ("tell your raid, '", Channel::Raid),
    ("tell your fellowship, '", Channel::Fellowship),
    ("shout, '", Channel::Shout),
    ("auction, '", Channel::Auction),
];

/// Phrases following another sender's name up to the quote lead.
const OTHER_PHRASES: [(&str, Channel); 9] = [
    (" says out of character", Channel::Ooc),
    (" says", Channel::Say),
    (" tells you", Channel::Tell),
    (" tells the guild", Channel::Guild),
    (" tells the group", Channel::Group),
    (" tells the raid", Channel::Raid),
    (" tells the fellowship", Channel::Fellowship),
    (" shouts", Channel::Shout),
    (" auctions", Channel::Auction),
];

pub(super) fn classify(ctx: &LineContext<'_>, text: &str) -> Option<ChatRecord> {
    if let Some(rest) = text.strip_prefix("You ")
        && let Some(record) = classify_self(ctx, rest)
    {
        return Some(record);
    }
    classify_other(ctx, text)
}

fn quoted(text: &str) -> String {
    text.strip_suffix('\'').unwrap_or(text).to_string()
}

fn classify_self(ctx: &LineContext<'_>, rest: &str) -> Option<ChatRecord> {
    let sender = intern(ctx.player());

    for (phrase, channel) in SELF_PHRASES {
        if let Some(body) = rest.strip_prefix(phrase) {
            return Some(ChatRecord {
                channel: channel.into_chat(),
                sender,
                receiver: None,
                text: quoted(body),
            });
        }
    }

    // "You told Kazint, '...'" and "You tell general:1, '...'"
    let pos = memmem::find(rest.as_bytes(), QUOTE_LEAD.as_bytes())?;
    let head = &rest[..pos];
    let body = quoted(&rest[pos + QUOTE_LEAD.len()..]);

    if let Some(receiver) = head.strip_prefix("told ")
        && !receiver.is_empty()
    {
        return Some(ChatRecord {
            channel: ChatChannel::Tell,
            sender,
            receiver: Some(intern(receiver)),
            text: body,
        });
    }

    let (name, _) = head.strip_prefix("tell ")?.split_once(':')?;
    if name.is_empty() || name.contains(' ') {
        return None;
    }
    Some(ChatRecord {
        channel: ChatChannel::Custom(intern(name)),
        sender,
        receiver: None,
        text: body,
    })
}

fn classify_other(ctx: &LineContext<'_>, text: &str) -> Option<ChatRecord> {
    let pos = memmem::find(text.as_bytes(), QUOTE_LEAD.as_bytes())?;
    let head = &text[..pos];
    let body = &text[pos + QUOTE_LEAD.len()..];

    for (phrase, channel) in OTHER_PHRASES {
        if let Some(sender) = head.strip_suffix(phrase) {
            if sender.is_empty() || sender.len() > CHAT_KEYWORD_WINDOW {
                return None;
            }

            if matches!(channel, Channel::Guild | Channel::Group | Channel::Raid) {
                ctx.register_player(sender);
            }
            let receiver = matches!(channel, Channel::Tell).then(|| intern(ctx.player()));
            return Some(ChatRecord {
                channel: channel.into_chat(),
                sender: intern(sender),
                receiver,
                text: quoted(body),
            });
        }
    }

    // "Kazint tells general:1, '...'"
    let keyword = memmem::find(head.as_bytes(), b" tells ")?;
    if keyword == 0 || keyword > CHAT_KEYWORD_WINDOW {
        return None;
    }
    let (name, number) = head[keyword + " tells ".len()..].split_once(':')?;
    if name.is_empty() || name.contains(' ') || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(ChatRecord {
        channel: ChatChannel::Custom(intern(name)),
        sender: intern(&head[..keyword]),
        receiver: None,
        text: quoted(body),
    })
}
