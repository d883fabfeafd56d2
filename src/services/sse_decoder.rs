//! 事件流解码器 - 能力层
//!
//! 服务端在 200 响应中返回伪 SSE 文本，形如：
//!
//! ```text
//! event: waiting
//! data:
//!
//! event: finished
//! data: 最终回答
//! ```
//!
//! 只有紧跟在 `event: finished` 之后的那一行才被当作数据行，
//! 其余事件（`waiting`、`generate` 等进度事件）全部忽略。

const EVENT_FINISHED_LINE: &str = "event: finished";
const DATA_LINE_PREFIX: &str = "data: ";

/// 从完整响应体中解码最终回答
///
/// - 第一个 `event: finished` 之前的行全部丢弃，空白行不参与相邻判断
/// - 多个 finished 数据按出现顺序直接拼接，不加分隔符
/// - 空输入或没有任何 finished 数据时返回空串
pub fn decode_answer(body: &str) -> String {
    data_lines(body).map(data_payload).collect()
}

/// 挑出所有紧跟在 finished 事件之后的行
fn data_lines(body: &str) -> impl Iterator<Item = &str> {
    let mut predecessor_finished = false;

    body.lines()
        .skip_while(|line| !is_finished_line(line))
        .filter(|line| !line.trim().is_empty())
        .filter_map(move |line| {
            if predecessor_finished {
                predecessor_finished = false;
                Some(line)
            } else {
                predecessor_finished = is_finished_line(line);
                None
            }
        })
}

fn is_finished_line(line: &str) -> bool {
    line.eq_ignore_ascii_case(EVENT_FINISHED_LINE)
}

/// 去掉 `data: ` 前缀，不是数据行时返回空串
fn data_payload(line: &str) -> &str {
    match line.get(..DATA_LINE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(DATA_LINE_PREFIX) => {
            &line[DATA_LINE_PREFIX.len()..]
        }
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_finished_event() {
        assert_eq!(decode_answer("event: finished\ndata: X\n"), "X");
    }

    #[test]
    fn test_progress_events_are_ignored() {
        assert_eq!(
            decode_answer("event: waiting\ndata: \n\nevent: finished\ndata: X\n"),
            "X"
        );

        let body = "event: waiting\ndata: \n\nevent: waiting\ndata: \n\n\
                    event: generate\ndata: Hans\n\nevent: generate\ndata: Hans Mustermann\n\n\
                    event: finished\ndata: Hans Mustermann\n";
        assert_eq!(decode_answer(body), "Hans Mustermann");
    }

    #[test]
    fn test_multiple_finished_events_are_concatenated() {
        assert_eq!(
            decode_answer("event: finished\ndata: A\n\nevent: finished\ndata: B\n"),
            "AB"
        );
        assert_eq!(
            decode_answer("\nevent: finished\ndata: First Answer\n\nevent: waiting\nevent: finished\ndata: Another answer\n"),
            "First AnswerAnother answer"
        );
    }

    #[test]
    fn test_empty_or_unfinished_body() {
        assert_eq!(decode_answer(""), "");
        assert_eq!(decode_answer("event: waiting"), "");
        assert_eq!(decode_answer("event: waiting\ndata: \n\nevent: waiting\ndata: \n\n"), "");
        assert_eq!(decode_answer("event: finished"), "");
    }

    #[test]
    fn test_blank_lines_between_event_and_data_are_tolerated() {
        assert_eq!(decode_answer("event: finished\n\n   \ndata: X\n"), "X");
    }

    #[test]
    fn test_case_insensitive_markers() {
        assert_eq!(decode_answer("EVENT: Finished\nDATA: X\n"), "X");
    }

    #[test]
    fn test_line_after_finished_without_data_prefix_is_empty() {
        assert_eq!(decode_answer("event: finished\nsomething else\nevent: finished\ndata: Y"), "Y");
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(decode_answer("event: finished\r\ndata: X\r\n"), "X");
    }
}
