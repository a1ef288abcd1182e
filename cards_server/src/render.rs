use cards_core::{Card, Snapshot};
use std::fmt::Write;

/// 浏览器端脚本：发送动作请求，用返回的状态片段更新页面。
/// 用 POST 并附带变化的数据，避免客户端缓存。
const CLIENT_SCRIPT: &str = r#"
function textOf(doc, tag) {
    var elements = doc.getElementsByTagName(tag);
    if (elements.length == 0 || elements[0].childNodes.length == 0) {
        return null;
    }
    return elements[0].childNodes[0].nodeValue;
}

function sendRequest(action) {
    var request = new XMLHttpRequest();
    request.onreadystatechange = function () {
        if (request.readyState != 4 || request.responseXML == null) {
            return;
        }
        var doc = request.responseXML;

        var message = textOf(doc, "message");
        document.getElementById("message").textContent = message == null ? " " : message;

        var deckFilename = textOf(doc, "deck-filename");
        if (deckFilename != null) {
            document.getElementById("deck").setAttribute("src", deckFilename);
        }
        var discardFilename = textOf(doc, "discard-filename");
        if (discardFilename != null) {
            document.getElementById("discard").setAttribute("src", discardFilename);
        }
        var cardsRemaining = textOf(doc, "cards-remaining");
        if (cardsRemaining != null) {
            document.getElementById("cards_remaining").textContent = cardsRemaining;
        }
    };
    request.open("POST", action, true);
    request.setRequestHeader("Content-Type", "application/x-www-form-urlencoded");
    request.send("cache-killer=" + encodeURIComponent(new Date().toString()));
}
"#;

/// (按钮文字, 动作路径)
const BUTTONS: [(&str, &str); 5] = [
    ("Reset", "reset"),
    ("Shuffle (Random)", "shuffle_random"),
    ("Shuffle (3-way-cut)", "shuffle_3waycut"),
    ("Shuffle (Riffle)", "shuffle_riffle"),
    ("Shutdown", "shutdown"),
];

/// 转义 HTML/XML 特殊字符
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// 主页面：牌堆、弃牌区、剩余张数、一次性消息和所有操作按钮
pub fn index_page(snapshot: &Snapshot) -> String {
    let mut html = String::new();
    html.push_str("<html>\n<head>\n<script type=\"text/javascript\">");
    html.push_str(CLIENT_SCRIPT);
    html.push_str("</script>\n<title>Cards</title>\n</head>\n<body>\n");
    html.push_str("<h2>Deck of Cards</h2>\n<p>Click on the deck to draw a card</p>\n");

    let _ = writeln!(
        html,
        "<div>\n<img id=\"deck\" src=\"{}\" onclick='sendRequest(\"draw\")' width=\"212\" height=\"287\" />",
        escape(snapshot.deck_filename())
    );
    let _ = writeln!(
        html,
        "<img id=\"discard\" src=\"{}\" width=\"212\" height=\"287\" />\n</div>",
        escape(&snapshot.discard_filename())
    );
    let _ = writeln!(
        html,
        "<div id=\"cards_remaining\">{}</div>",
        escape(&snapshot.cards_remaining_text())
    );
    let message = snapshot.message.as_deref().map(escape).unwrap_or_else(|| "&nbsp;".to_string());
    let _ = writeln!(html, "<div id=\"message\">{message}</div>");

    for (label, action) in BUTTONS {
        let _ = writeln!(
            html,
            "<input type=\"button\" value=\"{label}\" onclick='sendRequest(\"{action}\")'/><br/>"
        );
    }
    html.push_str("<form action=\"find\" method=\"get\"><input type=\"submit\" value=\"Find Card\" /></form>\n");
    html.push_str("</body>\n</html>\n");
    html
}

/// 状态片段，供浏览器脚本局部刷新页面
pub fn state_fragment(snapshot: &Snapshot) -> String {
    let mut xml = String::from("<state>\n");
    let _ = writeln!(xml, "<deck-filename>{}</deck-filename>", escape(snapshot.deck_filename()));
    let _ = writeln!(
        xml,
        "<discard-filename>{}</discard-filename>",
        escape(&snapshot.discard_filename())
    );
    let _ = writeln!(
        xml,
        "<cards-remaining>{}</cards-remaining>",
        escape(&snapshot.cards_remaining_text())
    );
    if let Some(message) = &snapshot.message {
        let _ = writeln!(xml, "<message>{}</message>", escape(message));
    }
    xml.push_str("</state>\n");
    xml
}

/// 选牌页面：列出全部 52 张牌（与当前牌堆无关），牌顶在前，每行 13 张。
/// 每张牌是一个图片按钮，提交时字段名为 "<牌名>.x" 和 "<牌名>.y"。
pub fn find_form() -> String {
    let mut html = String::from("<html>\n<head>\n<title>Find a Card</title>\n</head>\n<body>\n");
    html.push_str("<h2>Find a Card</h2>\nClick on the card to find:\n");
    html.push_str("<form action=\"findimpl\" method=\"post\">\n");

    let cards: Vec<Card> = Card::canonical().collect();
    for (index, card) in cards.iter().rev().enumerate() {
        if index % 13 == 0 {
            html.push_str("<div></div>\n");
        }
        let _ = writeln!(
            html,
            "<input type=\"image\" width=\"71\" height=\"96\" src=\"{}\" name=\"{}\" />",
            escape(&card.image_filename()),
            escape(&card.to_string())
        );
    }
    html.push_str("</form>\n</body>\n</html>\n");
    html
}

/// 页面加载后立即跳回主页
pub fn redirect_page() -> String {
    concat!(
        "<html>\n",
        "<body onload='document.forms[\"redirect\"].submit()'>\n",
        "<form name=\"redirect\" action=\"/\" method=\"get\"></form>\n",
        "</body>\n",
        "</html>\n",
    )
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cards_core::{Rank, Suit};

    fn snapshot(cards_remaining: usize, discard: Option<Card>, message: Option<&str>) -> Snapshot {
        Snapshot {
            cards_remaining,
            discard,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_fragment_fields() {
        let card = Card::new(Suit::Heart, Rank::Queen);
        let xml = state_fragment(&snapshot(40, Some(card), Some("hello")));
        assert!(xml.contains("<deck-filename>res/deck.png</deck-filename>"));
        assert!(xml.contains("<discard-filename>res/card_hearts_queen.png</discard-filename>"));
        assert!(xml.contains("<cards-remaining>Cards Remaining: 40</cards-remaining>"));
        assert!(xml.contains("<message>hello</message>"));
    }

    #[test]
    fn test_fragment_without_message_or_discard() {
        let xml = state_fragment(&snapshot(0, None, None));
        assert!(xml.contains("<deck-filename>res/deck_empty.png</deck-filename>"));
        assert!(xml.contains("<discard-filename>res/deck_blank.png</discard-filename>"));
        assert!(!xml.contains("<message>"));
    }

    #[test]
    fn test_index_page_escapes_message() {
        let html = index_page(&snapshot(52, None, Some("<b>bold</b>")));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains("Cards Remaining: 52"));
        assert!(html.contains("sendRequest(\"shuffle_3waycut\")"));

        let quiet = index_page(&snapshot(52, None, None));
        assert!(quiet.contains("<div id=\"message\">&nbsp;</div>"));
    }

    #[test]
    fn test_find_form_lists_every_card_top_first() {
        let html = find_form();
        assert_eq!(html.matches("type=\"image\"").count(), 52);
        assert_eq!(html.matches("<div></div>").count(), 4);
        let ace = html.find("name=\"ace of spades\"").unwrap();
        let king = html.find("name=\"king of clubs\"").unwrap();
        assert!(ace < king);
    }
}
