use crate::MessageRecord;
use crate::protocols::dnp3::DecodedFrame;

/// Bounded list of decoded application messages in capture order.
#[derive(Debug)]
pub(crate) struct MessageLog {
    limit: usize,
    records: Vec<MessageRecord>,
    dropped: u64,
}

impl MessageLog {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            records: Vec::new(),
            dropped: 0,
        }
    }

    /// Record the message completed by `frame`, if any.
    pub(crate) fn push(&mut self, frame: &DecodedFrame, src: &str, dst: &str, ts: Option<String>) {
        let Some(message) = &frame.message else {
            return;
        };
        if self.records.len() >= self.limit {
            self.dropped += 1;
            return;
        }
        let header = &message.header;
        let mut violations: Vec<String> = frame
            .all_annotations()
            .map(|annotation| annotation.kind.id().to_string())
            .collect();
        violations.dedup();

        self.records.push(MessageRecord {
            ts,
            src: src.to_string(),
            dst: dst.to_string(),
            link_source: frame.link.source,
            link_destination: frame.link.destination,
            from_master: frame.link.from_master(),
            function: header.function.name.to_string(),
            function_code: header.function.code,
            sequence: header.sequence,
            iin: header
                .iin
                .map(|iin| iin.names().into_iter().map(str::to_string).collect())
                .unwrap_or_default(),
            objects: serde_json::to_value(&message.objects).unwrap_or_default(),
            violations,
        });
    }

    /// Messages left out once the limit was reached.
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped
    }

    pub(crate) fn into_records(self) -> Vec<MessageRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::MessageLog;
    use crate::protocols::dnp3::Dnp3Decoder;
    use crate::protocols::dnp3::crc::crc16;

    fn frame(control: u8, destination: u16, source: u16, user_data: &[u8]) -> Vec<u8> {
        let mut out = vec![0x05, 0x64, (user_data.len() + 5) as u8, control];
        out.extend_from_slice(&destination.to_le_bytes());
        out.extend_from_slice(&source.to_le_bytes());
        let crc = crc16(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        for chunk in user_data.chunks(16) {
            out.extend_from_slice(chunk);
            out.extend_from_slice(&crc16(chunk).to_le_bytes());
        }
        out
    }

    #[test]
    fn records_messages_up_to_the_limit() {
        let mut decoder = Dnp3Decoder::default();
        let mut log = MessageLog::new(1);
        // Transport FIR|FIN, application READ of class 1 data.
        let read = frame(0xC4, 10, 1, &[0xC0, 0xC2, 0x01, 60, 2, 0x06]);
        for _ in 0..2 {
            let decoded = decoder.decode_frame(None, &read).unwrap().unwrap();
            log.push(&decoded, "10.0.0.1:49152", "10.0.0.2:20000", None);
        }
        assert_eq!(log.dropped(), 1);
        let records = log.into_records();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.function, "Read");
        assert_eq!(record.function_code, 1);
        assert_eq!(record.sequence, 2);
        assert!(record.from_master);
        assert_eq!(record.link_source, 1);
        assert_eq!(record.link_destination, 10);
        assert_eq!(record.objects[0]["group"], 60);
        assert!(record.violations.is_empty());
    }

    #[test]
    fn frames_without_message_are_ignored() {
        let mut decoder = Dnp3Decoder::default();
        let mut log = MessageLog::new(10);
        // Request Link Status carries no user data.
        let status = frame(0xC9, 10, 1, &[]);
        let decoded = decoder.decode_frame(None, &status).unwrap().unwrap();
        log.push(&decoded, "a", "b", None);
        assert!(log.into_records().is_empty());
    }
}
