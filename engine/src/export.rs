use crate::errors::EngineError;
use crate::types::{Centavos, Transaction};

/// Column order matches the prototype's wallet export.
pub const CSV_HEADER: &str = "Data,Tipo,Valor,Status,Descrição,Referência";

/// RFC 4180 field quoting: fields containing a comma, quote, or line
/// break are wrapped in quotes with embedded quotes doubled.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Centavos as decimal reais with two places: -5000 -> "-50.00".
pub fn format_amount(amount: Centavos) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

fn parse_amount(field: &str) -> Result<Centavos, EngineError> {
    let (sign, rest) = match field.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, field),
    };
    let (reais, centavos) = rest
        .split_once('.')
        .ok_or_else(|| EngineError::MalformedCsv(format!("bad amount: {field}")))?;
    if centavos.len() != 2 {
        return Err(EngineError::MalformedCsv(format!("bad amount: {field}")));
    }
    let reais: Centavos = reais
        .parse()
        .map_err(|_| EngineError::MalformedCsv(format!("bad amount: {field}")))?;
    let centavos: Centavos = centavos
        .parse()
        .map_err(|_| EngineError::MalformedCsv(format!("bad amount: {field}")))?;
    let total = reais
        .checked_mul(100)
        .and_then(|r| r.checked_add(centavos))
        .ok_or_else(|| EngineError::MalformedCsv(format!("bad amount: {field}")))?;
    Ok(sign * total)
}

/// Renders the transaction history as CSV, header first.
pub fn export_csv(transactions: &[Transaction]) -> String {
    let mut out = String::from(CSV_HEADER);
    for t in transactions {
        out.push('\n');
        let row = [
            t.timestamp.to_string(),
            t.kind.label().to_string(),
            format_amount(t.amount),
            t.status.label().to_string(),
            t.description.clone(),
            t.reference.clone(),
        ];
        let escaped: Vec<String> = row.iter().map(|f| escape_field(f)).collect();
        out.push_str(&escaped.join(","));
    }
    out
}

/// Splits CSV input into records, honoring quoted fields (which may
/// contain commas, doubled quotes, and line breaks).
fn parse_records(input: &str) -> Result<Vec<Vec<String>>, EngineError> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    if in_quotes {
        return Err(EngineError::MalformedCsv("unterminated quote".to_string()));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    Ok(records)
}

/// Parses an exported history back into transactions. Ids are assigned
/// by row order; the round trip preserves the
/// (date, type, amount, status, description, reference) tuples exactly.
pub fn parse_csv(input: &str) -> Result<Vec<Transaction>, EngineError> {
    let mut records = parse_records(input)?.into_iter();

    let header = records
        .next()
        .ok_or_else(|| EngineError::MalformedCsv("empty input".to_string()))?;
    let expected: Vec<&str> = CSV_HEADER.split(',').collect();
    if header != expected {
        return Err(EngineError::MalformedCsv("unexpected header".to_string()));
    }

    let mut transactions = Vec::new();
    for (row, record) in records.enumerate() {
        if record.len() != 6 {
            return Err(EngineError::MalformedCsv(format!(
                "row {} has {} fields",
                row + 1,
                record.len()
            )));
        }
        let timestamp = record[0]
            .parse()
            .map_err(|_| EngineError::MalformedCsv(format!("bad date: {}", record[0])))?;
        transactions.push(Transaction {
            id: row as u64,
            timestamp,
            kind: record[1].parse()?,
            amount: parse_amount(&record[2])?,
            status: record[3].parse()?,
            description: record[4].clone(),
            reference: record[5].clone(),
        });
    }
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TransactionKind, TransactionStatus};

    fn sample(id: u64, description: &str, amount: Centavos) -> Transaction {
        Transaction {
            id,
            timestamp: 1_684_108_800_000 + id,
            kind: if amount < 0 {
                TransactionKind::Wager
            } else {
                TransactionKind::Deposit
            },
            amount,
            status: TransactionStatus::Completed,
            description: description.to_string(),
            reference: format!("REF{id:06}"),
        }
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(10_000), "100.00");
        assert_eq!(format_amount(-5_000), "-50.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(-5), "-0.05");
    }

    #[test]
    fn test_export_header_and_rows() {
        let transactions = vec![sample(0, "Depósito via Pix", 10_000)];
        let csv = export_csv(&transactions);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        assert_eq!(
            lines.next(),
            Some("1684108800000,depósito,100.00,concluído,Depósito via Pix,REF000000")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_embedded_comma_is_quoted() {
        let transactions = vec![sample(0, "Aposta em Grêmio, Porto Alegre", -2_500)];
        let csv = export_csv(&transactions);
        assert!(csv.contains("\"Aposta em Grêmio, Porto Alegre\""));
    }

    #[test]
    fn test_embedded_quote_is_doubled() {
        let transactions = vec![sample(0, "Bolão \"Brasileirão\"", 2_500)];
        let csv = export_csv(&transactions);
        assert!(csv.contains("\"Bolão \"\"Brasileirão\"\"\""));
        let parsed = parse_csv(&csv).unwrap();
        assert_eq!(parsed[0].description, "Bolão \"Brasileirão\"");
    }

    #[test]
    fn test_round_trip_preserves_tuples() {
        let transactions = vec![
            sample(0, "Depósito via Pix", 10_000),
            sample(1, "Aposta em Flamengo vs Corinthians", -5_000),
            sample(2, "Prêmio, com vírgula", 20_000),
        ];
        let csv = export_csv(&transactions);
        let parsed = parse_csv(&csv).unwrap();

        assert_eq!(parsed.len(), transactions.len());
        for (original, parsed) in transactions.iter().zip(&parsed) {
            assert_eq!(parsed.timestamp, original.timestamp);
            assert_eq!(parsed.kind, original.kind);
            assert_eq!(parsed.amount, original.amount);
            assert_eq!(parsed.status, original.status);
            assert_eq!(parsed.description, original.description);
            assert_eq!(parsed.reference, original.reference);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let csv = format!("{CSV_HEADER}\n1000,jackpot,10.00,concluído,desc,REF1");
        let err = parse_csv(&csv).unwrap_err();
        assert_eq!(err, EngineError::UnsupportedKind("jackpot".to_string()));
    }

    #[test]
    fn test_parse_rejects_bad_shape() {
        let csv = format!("{CSV_HEADER}\n1000,depósito,10.00");
        assert!(matches!(
            parse_csv(&csv).unwrap_err(),
            EngineError::MalformedCsv(_)
        ));

        let no_header = "1000,depósito,10.00,concluído,desc,REF1";
        assert!(matches!(
            parse_csv(no_header).unwrap_err(),
            EngineError::MalformedCsv(_)
        ));
    }

    #[test]
    fn test_parse_rejects_overflowing_amount() {
        // Reais part parses as i64 but multiplying by 100 would overflow.
        let csv = format!("{CSV_HEADER}\n1000,depósito,92233720368547759.00,concluído,desc,REF1");
        assert!(matches!(
            parse_csv(&csv).unwrap_err(),
            EngineError::MalformedCsv(_)
        ));
    }

    #[test]
    fn test_parse_handles_crlf() {
        let csv = format!("{CSV_HEADER}\r\n1000,depósito,10.00,concluído,desc,REF1\r\n");
        let parsed = parse_csv(&csv).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].amount, 1_000);
    }

    #[test]
    fn test_empty_history_exports_header_only() {
        let csv = export_csv(&[]);
        assert_eq!(csv, CSV_HEADER);
        assert!(parse_csv(&csv).unwrap().is_empty());
    }
}
